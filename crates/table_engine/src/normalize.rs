//! Removal of redundant spans

use crate::marks::{PendingMarks, PendingWrite};
use crate::matrix::{self, FormalMatrix};
use crate::{Metrics, Result, TableEngine};
use doc_model::{table, DocumentTree, NodeId};
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// First column, other than the leading one, whose every slot repeats the
/// slot to its left. Holes are skipped.
fn redundant_column(matrix: &FormalMatrix) -> Option<usize> {
    (1..matrix.column_count()).find(|&j| {
        let mut occupied = false;
        let all_repeat = (0..matrix.len()).all(|i| match matrix.get(i, j) {
            Some(cell) => {
                occupied = true;
                matrix.get(i, j - 1) == Some(cell)
            }
            None => true,
        });
        occupied && all_repeat
    })
}

impl<M: Metrics> TableEngine<M> {
    /// Reduce the table to its minimal equivalent form.
    ///
    /// Column spans shared by every cell crossing a column boundary are
    /// trimmed one column at a time, rows hosting no cells are collapsed,
    /// row spans running past the last row are clipped, and `rowspan`,
    /// `colspan` and `class` attributes that carry no information are
    /// dropped. Running it twice leaves the table unchanged.
    pub fn normalize_table(&self, tree: &mut DocumentTree, table: NodeId) -> Result<()> {
        let mut trimmed_columns = 0;
        loop {
            let matrix = matrix::formal_matrix(tree, table)?;
            let Some(j) = redundant_column(&matrix) else {
                break;
            };

            let mut marks = PendingMarks::new();
            for &cell in matrix.rows().iter().filter_map(|row| row.get(j)).flatten() {
                if marks.pending_col_span(cell).is_none() {
                    let span = table::col_span(tree, cell);
                    marks.mark(cell, PendingWrite::ColSpan(span.saturating_sub(1)));
                }
            }
            marks.commit(tree)?;
            trimmed_columns += 1;
        }

        let collapsed_rows = self.collapse_empty_rows(tree, table)?;
        let clipped = clip_overflowing_rows(tree, table)?;

        let matrix = matrix::formal_matrix(tree, table)?;
        let mut seen = HashSet::new();
        for row in matrix.rows() {
            for &cell in row.iter().flatten() {
                if seen.insert(cell) {
                    drop_redundant_attributes(tree, cell)?;
                }
            }
        }

        debug!(%table, trimmed_columns, collapsed_rows, clipped, "normalized table");
        Ok(())
    }
}

/// Clip row spans that reach below the last row
fn clip_overflowing_rows(tree: &mut DocumentTree, table: NodeId) -> Result<usize> {
    let rows = table::row_count(tree, table)?;
    let mut origins: HashMap<NodeId, (usize, usize)> = HashMap::new();
    let matrix = matrix::formal_matrix_with(tree, table, |slot| {
        origins.entry(slot.cell).or_insert((slot.row, slot.row_span));
        ControlFlow::Continue(())
    })?;
    if matrix.len() <= rows {
        return Ok(0);
    }

    let mut marks = PendingMarks::new();
    for (cell, (row, span)) in origins {
        if row + span > rows {
            marks.mark(cell, PendingWrite::RowSpan((rows - row) as u32));
        }
    }
    let clipped = marks.len();
    warn!(%table, clipped, "clipping row spans past the last row");
    marks.commit(tree)?;
    Ok(clipped)
}

fn drop_redundant_attributes(tree: &mut DocumentTree, cell: NodeId) -> Result<()> {
    if tree.has_attribute(cell, "rowspan") && table::row_span(tree, cell) == 1 {
        tree.remove_attribute(cell, "rowspan")?;
    }
    if tree.has_attribute(cell, "colspan") && table::col_span(tree, cell) == 1 {
        tree.remove_attribute(cell, "colspan")?;
    }
    if tree.attribute(cell, "class").is_some_and(|class| class.trim().is_empty()) {
        tree.remove_attribute(cell, "class")?;
    }
    Ok(())
}
