//! Selection bound computation

use crate::matrix::{self, FormalMatrix};
use crate::{Metrics, Result, TableEngine};
use doc_model::{DocumentTree, NodeId};
use std::collections::{HashMap, HashSet};

/// An inclusive rectangle of formal matrix positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectedBound {
    pub top: usize,
    pub left: usize,
    /// Last row (inclusive)
    pub bottom: usize,
    /// Last column (inclusive)
    pub right: usize,
}

impl SelectedBound {
    /// Create a bound from two corners in any order
    pub fn new(row_a: usize, col_a: usize, row_b: usize, col_b: usize) -> Self {
        Self {
            top: row_a.min(row_b),
            left: col_a.min(col_b),
            bottom: row_a.max(row_b),
            right: col_a.max(col_b),
        }
    }

    /// Number of columns covered
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    /// Number of rows covered
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    /// Whether the bound covers exactly one slot
    pub fn is_single_slot(&self) -> bool {
        self.top == self.bottom && self.left == self.right
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.top..=self.bottom).contains(&row) && (self.left..=self.right).contains(&col)
    }

    /// `[[top, left], [bottom, right]]`
    pub fn as_pairs(&self) -> [[usize; 2]; 2] {
        [[self.top, self.left], [self.bottom, self.right]]
    }

    fn union(&mut self, other: &SelectedBound) -> bool {
        let before = *self;
        self.top = self.top.min(other.top);
        self.left = self.left.min(other.left);
        self.bottom = self.bottom.max(other.bottom);
        self.right = self.right.max(other.right);
        *self != before
    }
}

/// Extent of every cell in the matrix
fn cell_extents(matrix: &FormalMatrix) -> HashMap<NodeId, SelectedBound> {
    let mut extents: HashMap<NodeId, SelectedBound> = HashMap::new();
    for (i, row) in matrix.rows().iter().enumerate() {
        for (j, slot) in row.iter().enumerate() {
            let Some(cell) = *slot else { continue };
            let here = SelectedBound::new(i, j, i, j);
            extents
                .entry(cell)
                .and_modify(|extent| {
                    extent.union(&here);
                })
                .or_insert(here);
        }
    }
    extents
}

/// Smallest span-aware rectangle enclosing `selected`.
///
/// Starts from the slots the selected cells occupy and grows until no cell
/// inside the rectangle reaches outside it. Returns `None` when none of the
/// cells are in the matrix.
pub fn selected_bound(matrix: &FormalMatrix, selected: &[NodeId]) -> Option<SelectedBound> {
    let selected: HashSet<NodeId> = selected.iter().copied().collect();
    let extents = cell_extents(matrix);

    let mut bound: Option<SelectedBound> = None;
    for cell in &selected {
        let Some(extent) = extents.get(cell) else { continue };
        match bound.as_mut() {
            Some(b) => {
                b.union(extent);
            }
            None => bound = Some(*extent),
        }
    }
    let mut bound = bound?;

    loop {
        let mut grown = false;
        for i in bound.top..=bound.bottom {
            for j in bound.left..=bound.right {
                if let Some(extent) = matrix.get(i, j).and_then(|cell| extents.get(&cell)) {
                    grown |= bound.union(extent);
                }
            }
        }
        if !grown {
            return Some(bound);
        }
    }
}

impl<M: Metrics> TableEngine<M> {
    /// Bound of the given cells in a table's formal matrix
    pub fn get_selected_bound(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        selected: &[NodeId],
    ) -> Result<Option<SelectedBound>> {
        let matrix = matrix::formal_matrix(tree, table)?;
        Ok(selected_bound(&matrix, selected))
    }
}
