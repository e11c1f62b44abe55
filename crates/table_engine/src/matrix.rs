//! Formal matrix construction and coordinate queries
//!
//! The formal matrix maps every visual `(row, column)` position of a table
//! to the cell occupying it. It is derived from the live tree on every call
//! and never cached: any structural change invalidates it.

use crate::{Result, TableError};
use doc_model::{table, DocumentTree, NodeId};
use std::ops::ControlFlow;

/// One stamped slot, as reported to a matrix visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub cell: NodeId,
    pub row: usize,
    pub col: usize,
    pub col_span: usize,
    pub row_span: usize,
}

/// Dense grid of cell references.
///
/// Rows may be ragged and contain `None` holes when the source table is
/// malformed; such slots are tolerated by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormalMatrix {
    rows: Vec<Vec<Option<NodeId>>>,
}

impl FormalMatrix {
    /// Number of formal rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Logical column count: the longest formal row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at a formal position
    pub fn get(&self, row: usize, col: usize) -> Option<NodeId> {
        self.rows.get(row)?.get(col).copied().flatten()
    }

    /// A formal row (empty when out of range)
    pub fn row(&self, row: usize) -> &[Option<NodeId>] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Vec<Option<NodeId>>] {
        &self.rows
    }

    /// Number of slots in a formal row
    pub fn row_len(&self, row: usize) -> usize {
        self.row(row).len()
    }

    /// Whether every formal row has the same length and no holes
    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.rows
            .iter()
            .all(|r| r.len() == width && r.iter().all(Option::is_some))
    }

    fn ensure_row(&mut self, row: usize) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
    }

    fn occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    fn stamp(&mut self, row: usize, col: usize, cell: NodeId) {
        self.ensure_row(row);
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = Some(cell);
    }
}

/// Build the formal matrix of a table
pub fn formal_matrix(tree: &DocumentTree, table: NodeId) -> Result<FormalMatrix> {
    formal_matrix_with(tree, table, |_| ControlFlow::Continue(()))
}

/// Build the formal matrix, reporting every stamped slot to `visit`.
///
/// Rows are scanned top to bottom and cells left to right; each cell lands
/// on the first free column of its row. Returning `ControlFlow::Break` from
/// the visitor stops the scan and returns the partial matrix.
pub fn formal_matrix_with<F>(tree: &DocumentTree, table: NodeId, mut visit: F) -> Result<FormalMatrix>
where
    F: FnMut(Slot) -> ControlFlow<()>,
{
    let rows = table::table_rows(tree, table)?;
    let mut matrix = FormalMatrix::default();

    for (i, &row) in rows.iter().enumerate() {
        matrix.ensure_row(i);

        for cell in table::row_cells(tree, row) {
            let col_span = table::col_span(tree, cell) as usize;
            let row_span = table::row_span(tree, cell) as usize;

            let mut column = 0;
            while matrix.occupied(i, column) {
                column += 1;
            }

            for r in 0..row_span {
                for c in 0..col_span {
                    let slot = Slot {
                        cell,
                        row: i + r,
                        col: column + c,
                        col_span,
                        row_span,
                    };
                    if visit(slot).is_break() {
                        return Ok(matrix);
                    }
                    matrix.stamp(i + r, column + c, cell);
                }
            }
        }
    }

    Ok(matrix)
}

/// Number of rows in a table
pub fn rows_count(tree: &DocumentTree, table: NodeId) -> Result<usize> {
    Ok(table::row_count(tree, table)?)
}

/// Logical column count of a table
pub fn columns_count(tree: &DocumentTree, table: NodeId) -> Result<usize> {
    Ok(formal_matrix(tree, table)?.column_count())
}

/// Formal position and size of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCoordinate {
    pub row: usize,
    pub col: usize,
    /// Column span
    pub width: usize,
    /// Row span
    pub height: usize,
}

/// Locate a cell in the formal matrix.
///
/// Returns the first slot the cell occupies, or its last slot
/// (`row + height - 1`, `col + width - 1`) when `max` is set.
pub fn formal_coordinate(
    tree: &DocumentTree,
    table: NodeId,
    cell: NodeId,
    max: bool,
) -> Result<CellCoordinate> {
    let mut found = None;
    formal_matrix_with(tree, table, |slot| {
        if slot.cell != cell {
            return ControlFlow::Continue(());
        }
        let (row, col) = if max {
            (slot.row + slot.row_span - 1, slot.col + slot.col_span - 1)
        } else {
            (slot.row, slot.col)
        };
        found = Some(CellCoordinate {
            row,
            col,
            width: slot.col_span,
            height: slot.row_span,
        });
        ControlFlow::Break(())
    })?;

    found.ok_or(TableError::CellNotInTable(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{CellSpec, TableBuilder};

    #[test]
    fn test_plain_table() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(2, 3).build(&mut tree, root).unwrap();

        let matrix = formal_matrix(&tree, built.table).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.column_count(), 3);
        assert!(matrix.is_rectangular());
        assert_eq!(matrix.get(1, 2), Some(built.cells[1][2]));
        assert_eq!(matrix.get(2, 0), None);
    }

    #[test]
    fn test_spans_skip_occupied_columns() {
        // +---+---+---+
        // | a     | b |
        // +---+---+   +
        // | c | d |   |
        // +---+---+---+
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(2, 1), CellSpec::new("b").span(1, 2)])
            .row(["c", "d"])
            .build(&mut tree, root)
            .unwrap();
        let [a, b] = [built.cells[0][0], built.cells[0][1]];
        let [c, d] = [built.cells[1][0], built.cells[1][1]];

        let matrix = formal_matrix(&tree, built.table).unwrap();
        assert_eq!(matrix.row(0), &[Some(a), Some(a), Some(b)]);
        assert_eq!(matrix.row(1), &[Some(c), Some(d), Some(b)]);
        assert_eq!(columns_count(&tree, built.table).unwrap(), 3);
        assert_eq!(rows_count(&tree, built.table).unwrap(), 2);
    }

    #[test]
    fn test_row_span_pushes_later_cells_right() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(1, 2), CellSpec::new("b")])
            .row(["c"])
            .build(&mut tree, root)
            .unwrap();

        let matrix = formal_matrix(&tree, built.table).unwrap();
        assert_eq!(matrix.get(1, 0), Some(built.cells[0][0]));
        assert_eq!(matrix.get(1, 1), Some(built.cells[1][0]));
    }

    #[test]
    fn test_broken_table_keeps_holes() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row(["a", "b", "c"])
            .row(["d"])
            .build(&mut tree, root)
            .unwrap();

        let matrix = formal_matrix(&tree, built.table).unwrap();
        assert_eq!(matrix.column_count(), 3);
        assert_eq!(matrix.row_len(1), 1);
        assert_eq!(matrix.get(1, 2), None);
        assert!(!matrix.is_rectangular());
    }

    #[test]
    fn test_visitor_can_stop_early() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(3, 3).build(&mut tree, root).unwrap();

        let mut seen = 0;
        let matrix = formal_matrix_with(&tree, built.table, |slot| {
            seen += 1;
            if slot.row == 1 && slot.col == 0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        assert_eq!(seen, 4);
        assert_eq!(matrix.get(0, 2), Some(built.cells[0][2]));
        assert_eq!(matrix.get(1, 0), None);
    }

    #[test]
    fn test_formal_coordinate() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a"), CellSpec::new("b").span(2, 2)])
            .row(["c"])
            .build(&mut tree, root)
            .unwrap();
        let b = built.cells[0][1];

        let first = formal_coordinate(&tree, built.table, b, false).unwrap();
        assert_eq!(first, CellCoordinate { row: 0, col: 1, width: 2, height: 2 });

        let last = formal_coordinate(&tree, built.table, b, true).unwrap();
        assert_eq!((last.row, last.col), (1, 2));

        let stray = tree.create_element("td");
        assert!(matches!(
            formal_coordinate(&tree, built.table, stray, false),
            Err(TableError::CellNotInTable(id)) if id == stray
        ));
    }
}
