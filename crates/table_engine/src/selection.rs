//! Selection marker helpers
//!
//! The selection layer flags selected cells with a marker attribute; merge
//! and split operate on the flagged cells.

use crate::{Metrics, Result, TableEngine};
use doc_model::{table, DocumentTree, NodeId, Selector};

impl<M: Metrics> TableEngine<M> {
    /// Flag a cell as selected
    pub fn add_selected(&self, tree: &mut DocumentTree, cell: NodeId) -> Result<()> {
        tree.set_attribute(cell, &self.config().selected_marker, "1")?;
        Ok(())
    }

    /// Clear the selection flag of a cell
    pub fn restore_selection(&self, tree: &mut DocumentTree, cell: NodeId) -> Result<()> {
        tree.remove_attribute(cell, &self.config().selected_marker)?;
        Ok(())
    }

    /// Flagged cells of a table in document order. Cells of nested tables
    /// are not included.
    pub fn get_all_selected_cells(&self, tree: &DocumentTree, table: NodeId) -> Result<Vec<NodeId>> {
        let marker = &self.config().selected_marker;
        let selector = Selector::parse(&format!("td[{0}],th[{0}]", marker))?;
        Ok(tree
            .query_all(table, &selector)
            .into_iter()
            .filter(|&cell| table::owning_table(tree, cell) == Some(table))
            .collect())
    }
}
