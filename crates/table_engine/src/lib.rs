//! Table Engine - structural editing of HTML tables
//!
//! This crate maps a table's span-based markup onto a dense grid (the
//! formal matrix) and implements the structural operations of a rich-text
//! table editor on top of it:
//! - row and column insertion and removal
//! - span-aware selection bounds, merging and splitting of cells
//! - normalization of redundant spans
//! - column width redistribution
//!
//! Every operation rebuilds the matrix from the live [`doc_model`] tree
//! before reading it. Attribute writes that would disturb positions still
//! being read are queued in [`PendingMarks`] and committed at the end.

mod bound;
mod columns;
mod command;
mod config;
mod engine;
mod error;
mod marks;
pub mod matrix;
mod merge;
mod metrics;
mod normalize;
mod rows;
mod selection;
mod split;
mod widths;

pub use bound::{selected_bound, SelectedBound};
pub use command::{CommandOutcome, TableCommand};
pub use config::TableConfig;
pub use engine::TableEngine;
pub use error::*;
pub use marks::{PendingMarks, PendingWrite};
pub use matrix::{CellCoordinate, FormalMatrix, Slot};
pub use merge::is_blank_markup;
pub use metrics::{parse_length, CssLength, Metrics, StyleMetrics};
