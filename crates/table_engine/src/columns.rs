//! Column insertion and removal

use crate::marks::set_span;
use crate::matrix;
use crate::{Axis, Metrics, Result, TableEngine, TableError};
use doc_model::{table, DocumentTree, NodeId};
use std::collections::HashSet;
use tracing::{debug, warn};

impl<M: Metrics> TableEngine<M> {
    /// Insert a column after (or before) column `column`, the last column
    /// when `None`.
    ///
    /// Rows where the boundary falls inside a column span widen that cell
    /// instead of receiving a new one.
    pub fn append_column(
        &self,
        tree: &mut DocumentTree,
        table: NodeId,
        column: Option<usize>,
        after: bool,
    ) -> Result<()> {
        let matrix = matrix::formal_matrix(tree, table)?;
        let columns = matrix.column_count();
        let j = column.unwrap_or(columns.saturating_sub(1));
        if j >= columns {
            return Err(TableError::InvalidIndex {
                axis: Axis::Column,
                index: j,
                len: columns,
            });
        }

        let rows = table::table_rows(tree, table)?;
        let mut widened = HashSet::new();
        let mut inserted = 0;

        for (i, &row) in rows.iter().enumerate() {
            let Some(cell) = matrix.get(i, j) else {
                warn!(%table, row = i, col = j, "skipping hole in malformed table");
                continue;
            };

            let neighbor = if after {
                matrix.get(i, j + 1)
            } else {
                j.checked_sub(1).and_then(|left| matrix.get(i, left))
            };

            if neighbor == Some(cell) {
                if widened.insert(cell) {
                    let span = table::col_span(tree, cell);
                    set_span(tree, cell, "colspan", span + 1)?;
                }
                continue;
            }

            let start = if after { j + 1 } else { j };
            let anchor = matrix
                .row(i)
                .iter()
                .skip(start)
                .flatten()
                .copied()
                .find(|&c| tree.parent(c) == Some(row));
            let new_cell = self.create_cell(tree);
            tree.insert_before(row, new_cell, anchor)?;
            inserted += 1;
        }

        debug!(%table, column = j, after, inserted, widened = widened.len(), "appended column");
        Ok(())
    }

    /// Remove column `column`.
    ///
    /// Cells spanning into a neighboring column lose one column of span;
    /// the rest are deleted. Rows left without cells are removed.
    pub fn remove_column(&self, tree: &mut DocumentTree, table: NodeId, column: usize) -> Result<()> {
        let matrix = matrix::formal_matrix(tree, table)?;
        let columns = matrix.column_count();
        if column >= columns {
            return Err(TableError::InvalidIndex {
                axis: Axis::Column,
                index: column,
                len: columns,
            });
        }

        let mut processed = HashSet::new();
        let mut removed = 0;

        for i in 0..matrix.len() {
            let Some(cell) = matrix.get(i, column) else {
                warn!(%table, row = i, col = column, "skipping hole in malformed table");
                continue;
            };
            // A cell spanning several rows is handled at its top edge only.
            if !processed.insert(cell) {
                continue;
            }

            let spans_left = column > 0 && matrix.get(i, column - 1) == Some(cell);
            let spans_right = matrix.get(i, column + 1) == Some(cell);

            if spans_left || spans_right {
                let span = table::col_span(tree, cell);
                set_span(tree, cell, "colspan", span.saturating_sub(1))?;
            } else {
                tree.remove(cell)?;
                removed += 1;
            }
        }

        let collapsed = self.collapse_empty_rows(tree, table)?;
        debug!(%table, column, removed, collapsed, "removed column");
        Ok(())
    }
}
