//! Rendered width lookup
//!
//! Width redistribution needs the rendered pixel width of tables and cells.
//! The host supplies those through [`Metrics`]; [`StyleMetrics`] resolves
//! them from inline styles for hosts without a layout engine.

use crate::matrix;
use doc_model::{table, DocumentTree, NodeId};
use regex_lite::Regex;
use std::sync::OnceLock;

/// Source of rendered widths, in pixels
pub trait Metrics {
    /// Rendered width of a table
    fn table_width(&self, tree: &DocumentTree, table: NodeId) -> f64;

    /// Rendered width of a cell of `table`
    fn cell_width(&self, tree: &DocumentTree, table: NodeId, cell: NodeId) -> f64;
}

/// A parsed CSS length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Px(f64),
    Percent(f64),
}

fn length_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*(px|%)?\s*$").ok())
        .as_ref()
}

/// Parse a `px` or `%` length; unitless numbers are pixels
pub fn parse_length(value: &str) -> Option<CssLength> {
    let caps = length_pattern()?.captures(value)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("%") => Some(CssLength::Percent(number)),
        _ => Some(CssLength::Px(number)),
    }
}

/// Widths resolved from inline `width` styles and `width` attributes.
///
/// A table without a pixel width uses `fallback_table_width`. A cell without
/// a width gets an even share of the table per logical column it spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleMetrics {
    pub fallback_table_width: f64,
}

impl Default for StyleMetrics {
    fn default() -> Self {
        Self {
            fallback_table_width: 600.0,
        }
    }
}

impl StyleMetrics {
    pub fn new(fallback_table_width: f64) -> Self {
        Self {
            fallback_table_width,
        }
    }

    fn declared_width(tree: &DocumentTree, node: NodeId) -> Option<CssLength> {
        tree.style(node, "width")
            .or_else(|| tree.attribute(node, "width"))
            .and_then(parse_length)
    }
}

impl Metrics for StyleMetrics {
    fn table_width(&self, tree: &DocumentTree, table: NodeId) -> f64 {
        match Self::declared_width(tree, table) {
            Some(CssLength::Px(px)) => px,
            Some(CssLength::Percent(pct)) => self.fallback_table_width * pct / 100.0,
            None => self.fallback_table_width,
        }
    }

    fn cell_width(&self, tree: &DocumentTree, table: NodeId, cell: NodeId) -> f64 {
        let table_width = self.table_width(tree, table);
        match Self::declared_width(tree, cell) {
            Some(CssLength::Px(px)) => px,
            Some(CssLength::Percent(pct)) => table_width * pct / 100.0,
            None => {
                let columns = matrix::columns_count(tree, table)
                    .ok()
                    .filter(|&c| c > 0)
                    .unwrap_or(1);
                table_width * f64::from(table::col_span(tree, cell)) / columns as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{CellSpec, TableBuilder};

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("120px"), Some(CssLength::Px(120.0)));
        assert_eq!(parse_length(" 33.5% "), Some(CssLength::Percent(33.5)));
        assert_eq!(parse_length("80"), Some(CssLength::Px(80.0)));
        assert_eq!(parse_length("auto"), None);
        assert_eq!(parse_length("10em"), None);
    }

    #[test]
    fn test_style_metrics() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::new()
            .row([CellSpec::new("a").span(2, 1), CellSpec::new("b"), CellSpec::new("c")])
            .width("400px")
            .build(&mut tree, root)
            .unwrap();
        let [a, b, c] = [built.cells[0][0], built.cells[0][1], built.cells[0][2]];
        tree.set_style(b, "width", "25%").unwrap();
        tree.set_style(c, "width", "30px").unwrap();

        let metrics = StyleMetrics::default();
        assert_eq!(metrics.table_width(&tree, built.table), 400.0);
        assert_eq!(metrics.cell_width(&tree, built.table, a), 200.0);
        assert_eq!(metrics.cell_width(&tree, built.table, b), 100.0);
        assert_eq!(metrics.cell_width(&tree, built.table, c), 30.0);
    }

    #[test]
    fn test_fallback_table_width() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 3).build(&mut tree, root).unwrap();

        let metrics = StyleMetrics::new(300.0);
        assert_eq!(metrics.table_width(&tree, built.table), 300.0);
        assert_eq!(metrics.cell_width(&tree, built.table, built.cells[0][1]), 100.0);
    }
}
