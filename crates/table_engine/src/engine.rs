//! The table grid engine entry point

use crate::matrix::{self, CellCoordinate, FormalMatrix};
use crate::{Metrics, Result, StyleMetrics, TableConfig};
use doc_model::{DocumentTree, NodeId};

/// Structural table operations bound to a configuration and a width source.
///
/// The engine holds no table state: every operation takes the tree and the
/// table element, rebuilds the formal matrix and mutates the tree in place.
#[derive(Debug, Clone)]
pub struct TableEngine<M = StyleMetrics> {
    config: TableConfig,
    metrics: M,
}

impl TableEngine<StyleMetrics> {
    /// Engine with default configuration and style-derived widths
    pub fn new() -> Self {
        Self::with_metrics(TableConfig::default(), StyleMetrics::default())
    }

    /// Engine with the given configuration and style-derived widths
    pub fn with_config(config: TableConfig) -> Self {
        Self::with_metrics(config, StyleMetrics::default())
    }
}

impl Default for TableEngine<StyleMetrics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Metrics> TableEngine<M> {
    pub fn with_metrics(config: TableConfig, metrics: M) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Build the formal matrix of a table
    pub fn formal_matrix(&self, tree: &DocumentTree, table: NodeId) -> Result<FormalMatrix> {
        matrix::formal_matrix(tree, table)
    }

    /// Formal position of a cell; see [`matrix::formal_coordinate`]
    pub fn formal_coordinate(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        cell: NodeId,
        max: bool,
    ) -> Result<CellCoordinate> {
        matrix::formal_coordinate(tree, table, cell, max)
    }

    pub fn rows_count(&self, tree: &DocumentTree, table: NodeId) -> Result<usize> {
        matrix::rows_count(tree, table)
    }

    pub fn columns_count(&self, tree: &DocumentTree, table: NodeId) -> Result<usize> {
        matrix::columns_count(tree, table)
    }

    /// `px` as a formatted percentage of the table width.
    /// `None` when the table has no usable width.
    pub(crate) fn percent_of_table(&self, tree: &DocumentTree, table: NodeId, px: f64) -> Option<String> {
        let table_width = self.metrics.table_width(tree, table);
        if table_width <= 0.0 || !table_width.is_finite() {
            tracing::warn!(%table, table_width, "table has no usable width, skipping width update");
            return None;
        }
        Some(self.config.format_percent(px / table_width * 100.0))
    }

    /// Create a detached cell with the configured tag
    pub(crate) fn create_cell(&self, tree: &mut DocumentTree) -> NodeId {
        tree.create_element(&self.config.cell_tag)
    }
}
