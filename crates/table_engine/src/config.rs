//! Engine configuration

use crate::Result;
use serde::{Deserialize, Serialize};

/// Settings shared by every table operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Decimal places used when writing percentage widths
    pub precision: usize,
    /// Attribute the selection layer sets on selected cells
    pub selected_marker: String,
    /// Tag used for cells the engine creates
    pub cell_tag: String,
    /// Markup placed in cells created by a split
    pub split_cell_html: String,
    /// Separator placed between merged cell contents
    pub merge_separator: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            precision: 10,
            selected_marker: "data-selected-cell".to_string(),
            cell_tag: "td".to_string(),
            split_cell_html: "<br>".to_string(),
            merge_separator: "<br/>".to_string(),
        }
    }
}

impl TableConfig {
    /// Load settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Format a percentage with the configured precision, e.g. `"25.00%"`
    pub fn format_percent(&self, value: f64) -> String {
        format!("{:.*}%", self.precision, value)
    }
}
