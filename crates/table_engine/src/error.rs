//! Error types for table grid operations

use doc_model::NodeId;
use thiserror::Error;

/// Which axis an out-of-range index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Invalid {axis} index {index} (table has {len})")]
    InvalidIndex { axis: Axis, index: usize, len: usize },

    #[error("Cell {0} is not part of the table")]
    CellNotInTable(NodeId),

    #[error("Row {0} is not part of the table")]
    RowNotInTable(NodeId),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
