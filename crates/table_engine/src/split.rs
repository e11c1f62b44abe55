//! Splitting selected cells

use crate::marks::{PendingMarks, PendingWrite};
use crate::matrix;
use crate::{Axis, Metrics, Result, TableEngine, TableError};
use doc_model::{table, DocumentTree, NodeId};
use tracing::{debug, warn};

impl<M: Metrics> TableEngine<M> {
    /// Split every selected cell into a top and a bottom half.
    ///
    /// A cell spanning several rows gives up its last row to the new cell;
    /// a span running past the last row is first clipped to the table.
    /// Otherwise a new row is inserted below the cell and every other cell
    /// of its row grows by one row to cover it.
    pub fn split_horizontal(&self, tree: &mut DocumentTree, table: NodeId) -> Result<()> {
        let cells = self.get_all_selected_cells(tree, table)?;
        for &cell in &cells {
            self.split_cell_horizontally(tree, table, cell)?;
            self.restore_selection(tree, cell)?;
        }
        self.normalize_table(tree, table)?;
        debug!(%table, cells = cells.len(), "split cells horizontally");
        Ok(())
    }

    /// Split every selected cell into a left and a right half.
    ///
    /// A cell spanning several columns gives up one column to the new cell.
    /// Otherwise every other cell of its column grows by one column. Both
    /// halves get half the original width.
    pub fn split_vertical(&self, tree: &mut DocumentTree, table: NodeId) -> Result<()> {
        let cells = self.get_all_selected_cells(tree, table)?;
        for &cell in &cells {
            self.split_cell_vertically(tree, table, cell)?;
            self.restore_selection(tree, cell)?;
        }
        self.normalize_table(tree, table)?;
        debug!(%table, cells = cells.len(), "split cells vertically");
        Ok(())
    }

    fn create_split_cell(&self, tree: &mut DocumentTree) -> Result<NodeId> {
        let cell = self.create_cell(tree);
        tree.set_inner_html(cell, self.config().split_cell_html.as_str())?;
        Ok(cell)
    }

    fn split_cell_horizontally(&self, tree: &mut DocumentTree, table: NodeId, cell: NodeId) -> Result<()> {
        let coord = matrix::formal_coordinate(tree, table, cell, false)?;
        let matrix = matrix::formal_matrix(tree, table)?;
        let rows = table::table_rows(tree, table)?;
        let mut marks = PendingMarks::new();

        // Rows the cell covers inside the table
        let height = coord.height.min(rows.len().saturating_sub(coord.row)).max(1);
        if height < coord.height {
            warn!(%table, %cell, span = coord.height, height, "clipping row span to the last row");
        }

        let new_cell = if height < 2 {
            if coord.height > 1 {
                marks.mark(cell, PendingWrite::RowSpan(1));
            }
            for &other in matrix.row(coord.row).iter().flatten() {
                if other != cell && marks.pending_row_span(other).is_none() {
                    let span = table::row_span(tree, other);
                    marks.mark(other, PendingWrite::RowSpan(span + 1));
                }
            }

            let host = table::owning_row(tree, cell).ok_or(TableError::CellNotInTable(cell))?;
            let new_row = tree.create_element("tr");
            tree.insert_after(host, new_row)?;
            let new_cell = self.create_split_cell(tree)?;
            tree.append_child(new_row, new_cell)?;
            new_cell
        } else {
            let target = coord.row + height - 1;
            let target_row = *rows.get(target).ok_or(TableError::InvalidIndex {
                axis: Axis::Row,
                index: target,
                len: rows.len(),
            })?;
            marks.mark(cell, PendingWrite::RowSpan(height as u32 - 1));

            let anchor = matrix
                .row(target)
                .iter()
                .take(coord.col)
                .flatten()
                .copied()
                .filter(|&c| tree.parent(c) == Some(target_row))
                .last();
            let new_cell = self.create_split_cell(tree)?;
            match anchor {
                Some(anchor) => tree.insert_after(anchor, new_cell)?,
                None => tree.prepend_child(target_row, new_cell)?,
            }
            new_cell
        };

        if coord.width > 1 {
            marks.mark(new_cell, PendingWrite::ColSpan(coord.width as u32));
        }
        marks.commit(tree)
    }

    fn split_cell_vertically(&self, tree: &mut DocumentTree, table: NodeId, cell: NodeId) -> Result<()> {
        let coord = matrix::formal_coordinate(tree, table, cell, false)?;
        let matrix = matrix::formal_matrix(tree, table)?;
        let mut marks = PendingMarks::new();

        if coord.width < 2 {
            for i in 0..matrix.len() {
                let Some(other) = matrix.get(i, coord.col) else {
                    continue;
                };
                if other != cell && marks.pending_col_span(other).is_none() {
                    let span = table::col_span(tree, other);
                    marks.mark(other, PendingWrite::ColSpan(span + 1));
                }
            }
        } else {
            marks.mark(cell, PendingWrite::ColSpan(coord.width as u32 - 1));
        }

        let half = self.metrics().cell_width(tree, table, cell) / 2.0;
        let half = self.percent_of_table(tree, table, half);

        let new_cell = self.create_split_cell(tree)?;
        if coord.height > 1 {
            marks.mark(new_cell, PendingWrite::RowSpan(coord.height as u32));
        }
        tree.insert_after(cell, new_cell)?;

        if let Some(half) = half {
            marks.mark(cell, PendingWrite::Width(half.clone()));
            marks.mark(new_cell, PendingWrite::Width(half));
        }
        marks.commit(tree)
    }
}
