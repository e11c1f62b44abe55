//! Column width redistribution

use crate::marks::{PendingMarks, PendingWrite};
use crate::matrix::{self, FormalMatrix};
use crate::{Axis, Metrics, Result, TableEngine, TableError};
use doc_model::{DocumentTree, NodeId};
use std::collections::HashSet;
use tracing::{debug, warn};

impl<M: Metrics> TableEngine<M> {
    /// Set every cell in `column` to its current width plus `delta` pixels,
    /// written as a percentage of the table width.
    pub fn set_column_width_by_delta(
        &self,
        tree: &mut DocumentTree,
        table: NodeId,
        column: usize,
        delta: f64,
    ) -> Result<()> {
        let matrix = matrix::formal_matrix(tree, table)?;
        let mut marks = PendingMarks::new();
        self.queue_column_width(tree, table, &matrix, column, delta, &mut marks)?;
        marks.commit(tree)
    }

    /// Queue the width writes of [`Self::set_column_width_by_delta`]
    /// without committing them
    pub(crate) fn queue_column_width(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        matrix: &FormalMatrix,
        column: usize,
        delta: f64,
        marks: &mut PendingMarks,
    ) -> Result<()> {
        let columns = matrix.column_count();
        if column >= columns {
            return Err(TableError::InvalidIndex {
                axis: Axis::Column,
                index: column,
                len: columns,
            });
        }

        let mut seen = HashSet::new();
        for i in 0..matrix.len() {
            let Some(cell) = matrix.get(i, column) else {
                warn!(%table, row = i, col = column, "skipping hole in malformed table");
                continue;
            };
            if !seen.insert(cell) {
                continue;
            }
            let width = self.metrics().cell_width(tree, table, cell) + delta;
            let Some(percent) = self.percent_of_table(tree, table, width) else {
                return Ok(());
            };
            marks.mark(cell, PendingWrite::Width(percent));
        }

        debug!(%table, column, delta, cells = seen.len(), "queued column width");
        Ok(())
    }
}
