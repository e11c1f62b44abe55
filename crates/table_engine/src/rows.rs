//! Row insertion and removal

use crate::marks::set_span;
use crate::matrix;
use crate::{Axis, Metrics, Result, TableEngine, TableError};
use doc_model::{table, DocumentTree, NodeId};
use std::collections::HashSet;
use tracing::{debug, warn};

impl<M: Metrics> TableEngine<M> {
    /// Insert a row of plain cells, one per logical column.
    ///
    /// The row goes after (or before) `reference` when given, otherwise at
    /// the end of the table body. Cells spanning across the insertion point
    /// grow by one row instead of receiving a new cell. Returns the new row.
    pub fn append_row(
        &self,
        tree: &mut DocumentTree,
        table: NodeId,
        reference: Option<NodeId>,
        after: bool,
    ) -> Result<NodeId> {
        let rows = table::table_rows(tree, table)?;
        // Formal rows directly above and below the new row
        let boundary = match reference {
            Some(reference) => {
                let index = rows
                    .iter()
                    .position(|&r| r == reference)
                    .ok_or(TableError::RowNotInTable(reference))?;
                if after {
                    Some((index, index + 1))
                } else {
                    index.checked_sub(1).map(|above| (above, index))
                }
            }
            None => None,
        };

        let matrix = matrix::formal_matrix(tree, table)?;
        let columns = matrix.column_count().max(1);
        let row = tree.create_element("tr");
        let mut widened = HashSet::new();

        for j in 0..columns {
            let crossing = boundary.and_then(|(above, below)| {
                matrix
                    .get(above, j)
                    .filter(|&cell| matrix.get(below, j) == Some(cell))
            });
            match crossing {
                Some(cell) => {
                    if widened.insert(cell) {
                        let span = table::row_span(tree, cell);
                        set_span(tree, cell, "rowspan", span + 1)?;
                    }
                }
                None => {
                    let cell = self.create_cell(tree);
                    tree.append_child(row, cell)?;
                }
            }
        }

        match reference {
            Some(reference) if after => tree.insert_after(reference, row)?,
            Some(reference) => {
                let parent = tree
                    .parent(reference)
                    .ok_or(TableError::RowNotInTable(reference))?;
                tree.insert_before(parent, row, Some(reference))?;
            }
            None => {
                let host = table::body_section(tree, table).unwrap_or(table);
                tree.append_child(host, row)?;
            }
        }

        debug!(%table, %row, columns, widened = widened.len(), after, "appended row");
        Ok(row)
    }

    /// Remove the row at `index`, keeping cells that span through it.
    ///
    /// Cells reaching in from above lose one row of span. Cells hosted by the
    /// removed row that continue downward move into the next row, keeping
    /// their left-to-right order there. All other cells of the row are
    /// deleted with it.
    pub fn remove_row(&self, tree: &mut DocumentTree, table: NodeId, index: usize) -> Result<()> {
        let rows = table::table_rows(tree, table)?;
        let Some(&row) = rows.get(index) else {
            return Err(TableError::InvalidIndex {
                axis: Axis::Row,
                index,
                len: rows.len(),
            });
        };

        let matrix = matrix::formal_matrix(tree, table)?;
        let next_row = tree
            .next_matching_sibling(row, |e| e.is_row())
            .or_else(|| rows.get(index + 1).copied());

        let mut processed = HashSet::new();
        let mut relocated = 0;
        let mut removed = 0;

        for (j, slot) in matrix.row(index).iter().enumerate() {
            let Some(cell) = *slot else {
                warn!(%table, row = index, col = j, "skipping hole in malformed table");
                continue;
            };
            if !processed.insert(cell) {
                continue;
            }

            let spans_from_above = index > 0 && matrix.get(index - 1, j) == Some(cell);
            let spans_below = matrix.get(index + 1, j) == Some(cell);

            if spans_from_above {
                shrink_row_span(tree, cell)?;
            } else if spans_below {
                let hosted_here = tree.parent(cell) == Some(row);
                if let Some(next_row) = next_row.filter(|_| hosted_here) {
                    let mut end = j + 1;
                    while matrix.get(index + 1, end) == Some(cell) {
                        end += 1;
                    }
                    let anchor = matrix
                        .row(index + 1)
                        .iter()
                        .skip(end)
                        .flatten()
                        .copied()
                        .find(|&c| tree.parent(c) == Some(next_row));
                    tree.insert_before(next_row, cell, anchor)?;
                    relocated += 1;
                }
                shrink_row_span(tree, cell)?;
            } else {
                tree.remove(cell)?;
                removed += 1;
            }
        }

        tree.remove(row)?;
        debug!(%table, index, relocated, removed, "removed row");
        Ok(())
    }

    /// Remove rows that host no cells, taking one row of span from every
    /// cell crossing them. Returns the number of rows removed.
    pub(crate) fn collapse_empty_rows(&self, tree: &mut DocumentTree, table: NodeId) -> Result<usize> {
        let rows = table::table_rows(tree, table)?;
        let mut collapsed = 0;

        for (index, &row) in rows.iter().enumerate().rev() {
            if !table::row_cells(tree, row).is_empty() {
                continue;
            }
            let matrix = matrix::formal_matrix(tree, table)?;
            let mut processed = HashSet::new();
            for &cell in matrix.row(index).iter().flatten() {
                if processed.insert(cell) {
                    shrink_row_span(tree, cell)?;
                }
            }
            tree.remove(row)?;
            collapsed += 1;
        }

        if collapsed > 0 {
            debug!(%table, collapsed, "collapsed empty rows");
        }
        Ok(collapsed)
    }
}

fn shrink_row_span(tree: &mut DocumentTree, cell: NodeId) -> Result<()> {
    let span = table::row_span(tree, cell);
    set_span(tree, cell, "rowspan", span.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::formal_matrix;
    use doc_model::{CellSpec, TableBuilder};

    fn contents(tree: &DocumentTree, table: NodeId) -> Vec<Vec<String>> {
        table::table_rows(tree, table)
            .unwrap()
            .into_iter()
            .map(|row| {
                table::row_cells(tree, row)
                    .into_iter()
                    .map(|cell| tree.inner_html(cell).unwrap())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_append_row_at_end() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(2, 1), CellSpec::new("b")])
            .build(&mut tree, root)
            .unwrap();
        let engine = TableEngine::new();

        let row = engine.append_row(&mut tree, built.table, None, true).unwrap();
        assert_eq!(tree.parent(row), built.body);
        assert_eq!(table::row_cells(&tree, row).len(), 3);
        assert!(formal_matrix(&tree, built.table).unwrap().is_rectangular());
    }

    #[test]
    fn test_append_row_before_and_after_reference() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(2, 2).build(&mut tree, root).unwrap();
        let engine = TableEngine::new();

        let after = engine
            .append_row(&mut tree, built.table, Some(built.rows[0]), true)
            .unwrap();
        let before = engine
            .append_row(&mut tree, built.table, Some(built.rows[0]), false)
            .unwrap();

        let rows = table::table_rows(&tree, built.table).unwrap();
        assert_eq!(rows, vec![before, built.rows[0], after, built.rows[1]]);
    }

    #[test]
    fn test_append_row_inside_row_span() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(1, 2), CellSpec::new("b")])
            .row(["c"])
            .build(&mut tree, root)
            .unwrap();
        let a = built.cells[0][0];
        let engine = TableEngine::new();

        let row = engine
            .append_row(&mut tree, built.table, Some(built.rows[0]), true)
            .unwrap();
        assert_eq!(table::row_cells(&tree, row).len(), 1);
        assert_eq!(tree.attribute(a, "rowspan"), Some("3"));

        // Above the first row nothing crosses the boundary.
        let top = engine
            .append_row(&mut tree, built.table, Some(built.rows[0]), false)
            .unwrap();
        assert_eq!(table::row_cells(&tree, top).len(), 2);
        assert!(formal_matrix(&tree, built.table).unwrap().is_rectangular());
    }

    #[test]
    fn test_append_row_rejects_foreign_reference() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 1).build(&mut tree, root).unwrap();
        let other = TableBuilder::grid(1, 1).build(&mut tree, root).unwrap();

        let result = TableEngine::new().append_row(&mut tree, built.table, Some(other.rows[0]), true);
        assert!(matches!(result, Err(TableError::RowNotInTable(_))));
    }

    #[test]
    fn test_remove_plain_row() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(3, 2).build(&mut tree, root).unwrap();

        TableEngine::new().remove_row(&mut tree, built.table, 1).unwrap();
        assert_eq!(
            contents(&tree, built.table),
            vec![vec!["0,0", "0,1"], vec!["2,0", "2,1"]]
        );
        assert!(!tree.contains(built.cells[1][0]));
    }

    #[test]
    fn test_remove_row_shrinks_span_from_above() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(1, 3), CellSpec::new("b")])
            .row(["c"])
            .row(["d"])
            .build(&mut tree, root)
            .unwrap();
        let a = built.cells[0][0];

        TableEngine::new().remove_row(&mut tree, built.table, 1).unwrap();
        assert_eq!(tree.attribute(a, "rowspan"), Some("2"));
        assert_eq!(contents(&tree, built.table), vec![vec!["a", "b"], vec!["d"]]);
        assert!(formal_matrix(&tree, built.table).unwrap().is_rectangular());
    }

    #[test]
    fn test_remove_row_relocates_spanning_cell() {
        // +---+---+---+
        // | a | b | c |
        // +---+   +---+
        // | d |   | e |
        // +---+---+---+
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a"), CellSpec::new("b").span(1, 2), CellSpec::new("c")])
            .row(["d", "e"])
            .build(&mut tree, root)
            .unwrap();
        let b = built.cells[0][1];

        TableEngine::new().remove_row(&mut tree, built.table, 0).unwrap();
        assert_eq!(contents(&tree, built.table), vec![vec!["d", "b", "e"]]);
        assert!(!tree.has_attribute(b, "rowspan"));
        assert!(formal_matrix(&tree, built.table).unwrap().is_rectangular());
    }

    #[test]
    fn test_remove_row_decrements_wide_span_once() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(2, 3)])
            .row(Vec::<CellSpec>::new())
            .row(Vec::<CellSpec>::new())
            .build(&mut tree, root)
            .unwrap();
        let a = built.cells[0][0];

        TableEngine::new().remove_row(&mut tree, built.table, 0).unwrap();
        assert_eq!(tree.attribute(a, "rowspan"), Some("2"));
        assert_eq!(tree.attribute(a, "colspan"), Some("2"));
        assert_eq!(tree.parent(a), Some(built.rows[1]));
    }

    #[test]
    fn test_remove_row_out_of_range() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(2, 2).build(&mut tree, root).unwrap();

        let result = TableEngine::new().remove_row(&mut tree, built.table, 2);
        assert!(matches!(
            result,
            Err(TableError::InvalidIndex { axis: Axis::Row, index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_collapse_empty_rows() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(1, 3), CellSpec::new("b").span(1, 2)])
            .row(Vec::<CellSpec>::new())
            .row(["c"])
            .build(&mut tree, root)
            .unwrap();
        let [a, b] = [built.cells[0][0], built.cells[0][1]];

        let collapsed = TableEngine::new()
            .collapse_empty_rows(&mut tree, built.table)
            .unwrap();
        assert_eq!(collapsed, 1);
        assert_eq!(tree.attribute(a, "rowspan"), Some("2"));
        assert!(!tree.has_attribute(b, "rowspan"));

        let matrix = formal_matrix(&tree, built.table).unwrap();
        assert!(matrix.is_rectangular());
        assert_eq!(matrix.get(1, 1), Some(built.cells[2][0]));
    }

    #[test]
    fn test_remove_row_skips_holes() {
        // +---+---+---+
        // | a | b | c |
        // +---+---+   +
        // | d |     c |
        // +---+   +---+
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a"), CellSpec::new("b"), CellSpec::new("c").span(1, 2)])
            .row(["d"])
            .build(&mut tree, root)
            .unwrap();
        let engine = TableEngine::new();
        let c = built.cells[0][2];

        engine.remove_row(&mut tree, built.table, 1).unwrap();

        assert_eq!(contents(&tree, built.table), vec![vec!["a", "b", "c"]]);
        assert!(!tree.contains(built.cells[1][0]));
        assert!(!tree.has_attribute(c, "rowspan"));

        engine.normalize_table(&mut tree, built.table).unwrap();
        assert!(formal_matrix(&tree, built.table).unwrap().is_rectangular());
    }

    #[test]
    fn test_remove_row_with_overlapping_spans() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a"), CellSpec::new("b").span(1, 2)])
            .row([CellSpec::new("c").span(2, 1)])
            .build(&mut tree, root)
            .unwrap();
        let engine = TableEngine::new();
        let c = built.cells[1][0];

        engine.remove_row(&mut tree, built.table, 0).unwrap();
        assert_eq!(contents(&tree, built.table), vec![vec!["c"]]);
        assert_eq!(tree.attribute(c, "colspan"), Some("2"));

        engine.normalize_table(&mut tree, built.table).unwrap();
        assert!(!tree.has_attribute(c, "colspan"));
        assert_eq!(formal_matrix(&tree, built.table).unwrap().column_count(), 1);
    }
}
