//! Document Model - HTML element tree for the table engine
//!
//! This crate provides the element tree the table grid engine mutates:
//! stable node IDs, elements with attributes, inline styles and markup
//! content, structural operations with DOM semantics, selector queries, and
//! table accessors that reflect span attributes the way a browser does.

mod error;
mod html;
mod node;
mod selector;
mod tree;
pub mod table;

pub use error::*;
pub use html::escape_attribute;
pub use node::*;
pub use selector::*;
pub use tree::*;
pub use table::{BuiltTable, CellSpec, TableBuilder};
