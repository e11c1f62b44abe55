//! Serializable table commands
//!
//! Host editors bind menu items and keyboard shortcuts to [`TableCommand`]
//! values and dispatch them through [`TableEngine::execute`].

use crate::{Axis, Metrics, Result, TableEngine, TableError};
use doc_model::{table, DocumentTree, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug_span;

fn default_after() -> bool {
    true
}

/// A structural table operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TableCommand {
    /// Insert a row next to row `reference`, or at the end of the table
    InsertRow {
        #[serde(default)]
        reference: Option<usize>,
        #[serde(default = "default_after")]
        after: bool,
    },
    DeleteRow { row: usize },
    /// Insert a column next to `column`, or after the last column
    InsertColumn {
        #[serde(default)]
        column: Option<usize>,
        #[serde(default = "default_after")]
        after: bool,
    },
    DeleteColumn { column: usize },
    MergeSelected,
    SplitHorizontal,
    SplitVertical,
    Normalize,
    SetColumnWidthByDelta { column: usize, delta: f64 },
}

impl TableCommand {
    /// Name shown in menus and undo history
    pub fn display_name(&self) -> &str {
        match self {
            TableCommand::InsertRow { after: true, .. } => "Insert Row Below",
            TableCommand::InsertRow { after: false, .. } => "Insert Row Above",
            TableCommand::DeleteRow { .. } => "Delete Row",
            TableCommand::InsertColumn { after: true, .. } => "Insert Column Right",
            TableCommand::InsertColumn { after: false, .. } => "Insert Column Left",
            TableCommand::DeleteColumn { .. } => "Delete Column",
            TableCommand::MergeSelected => "Merge Cells",
            TableCommand::SplitHorizontal => "Split Cell Horizontally",
            TableCommand::SplitVertical => "Split Cell Vertically",
            TableCommand::Normalize => "Normalize Table",
            TableCommand::SetColumnWidthByDelta { .. } => "Resize Column",
        }
    }

    /// Parse a command from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What a command produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command changed the table in place
    Applied,
    /// A row was inserted
    RowInserted(NodeId),
    /// Cells were merged into the given cell
    Merged(NodeId),
    /// Nothing to do, e.g. merging a single cell
    Unchanged,
}

impl<M: Metrics> TableEngine<M> {
    /// Run a command against a table
    pub fn execute(
        &self,
        tree: &mut DocumentTree,
        table: NodeId,
        command: &TableCommand,
    ) -> Result<CommandOutcome> {
        let span = debug_span!("table_command", %table, command = command.display_name());
        let _guard = span.enter();

        match *command {
            TableCommand::InsertRow { reference, after } => {
                let reference = match reference {
                    Some(index) => {
                        let rows = table::table_rows(tree, table)?;
                        let row = rows.get(index).copied().ok_or(TableError::InvalidIndex {
                            axis: Axis::Row,
                            index,
                            len: rows.len(),
                        })?;
                        Some(row)
                    }
                    None => None,
                };
                let row = self.append_row(tree, table, reference, after)?;
                Ok(CommandOutcome::RowInserted(row))
            }
            TableCommand::DeleteRow { row } => {
                self.remove_row(tree, table, row)?;
                Ok(CommandOutcome::Applied)
            }
            TableCommand::InsertColumn { column, after } => {
                self.append_column(tree, table, column, after)?;
                Ok(CommandOutcome::Applied)
            }
            TableCommand::DeleteColumn { column } => {
                self.remove_column(tree, table, column)?;
                Ok(CommandOutcome::Applied)
            }
            TableCommand::MergeSelected => Ok(match self.merge_selected(tree, table)? {
                Some(cell) => CommandOutcome::Merged(cell),
                None => CommandOutcome::Unchanged,
            }),
            TableCommand::SplitHorizontal => {
                self.split_horizontal(tree, table)?;
                Ok(CommandOutcome::Applied)
            }
            TableCommand::SplitVertical => {
                self.split_vertical(tree, table)?;
                Ok(CommandOutcome::Applied)
            }
            TableCommand::Normalize => {
                self.normalize_table(tree, table)?;
                Ok(CommandOutcome::Applied)
            }
            TableCommand::SetColumnWidthByDelta { column, delta } => {
                self.set_column_width_by_delta(tree, table, column, delta)?;
                Ok(CommandOutcome::Applied)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::formal_matrix;
    use doc_model::TableBuilder;

    #[test]
    fn test_command_json() {
        let command = TableCommand::from_json(r#"{ "op": "insert_row" }"#).unwrap();
        assert_eq!(command, TableCommand::InsertRow { reference: None, after: true });

        let command =
            TableCommand::from_json(r#"{ "op": "set_column_width_by_delta", "column": 1, "delta": -12.5 }"#)
                .unwrap();
        assert_eq!(command, TableCommand::SetColumnWidthByDelta { column: 1, delta: -12.5 });

        let json = serde_json::to_string(&TableCommand::MergeSelected).unwrap();
        assert_eq!(json, r#"{"op":"merge_selected"}"#);

        assert!(TableCommand::from_json(r#"{ "op": "explode" }"#).is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            TableCommand::InsertColumn { column: None, after: false }.display_name(),
            "Insert Column Left"
        );
        assert_eq!(TableCommand::DeleteRow { row: 0 }.display_name(), "Delete Row");
    }

    #[test]
    fn test_execute_sequence() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(2, 2).build(&mut tree, root).unwrap();
        let engine = TableEngine::new();

        let outcome = engine
            .execute(&mut tree, built.table, &TableCommand::InsertRow { reference: Some(0), after: true })
            .unwrap();
        let CommandOutcome::RowInserted(row) = outcome else {
            panic!("expected a new row, got {:?}", outcome);
        };
        assert_eq!(table::row_index(&tree, built.table, row), Some(1));

        engine
            .execute(&mut tree, built.table, &TableCommand::InsertColumn { column: None, after: true })
            .unwrap();
        engine
            .execute(&mut tree, built.table, &TableCommand::DeleteRow { row: 0 })
            .unwrap();

        let matrix = formal_matrix(&tree, built.table).unwrap();
        assert_eq!((matrix.len(), matrix.column_count()), (2, 3));
        assert!(matrix.is_rectangular());

        assert_eq!(
            engine
                .execute(&mut tree, built.table, &TableCommand::MergeSelected)
                .unwrap(),
            CommandOutcome::Unchanged
        );
    }

    #[test]
    fn test_execute_rejects_bad_row() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 1).build(&mut tree, root).unwrap();

        let result = TableEngine::new().execute(
            &mut tree,
            built.table,
            &TableCommand::InsertRow { reference: Some(3), after: true },
        );
        assert!(matches!(
            result,
            Err(TableError::InvalidIndex { axis: Axis::Row, index: 3, len: 1 })
        ));
    }
}
