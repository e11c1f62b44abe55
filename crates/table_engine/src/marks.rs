//! Deferred cell writes
//!
//! Operations that read positions from a matrix built before the mutation
//! queue their attribute writes here and commit them in one pass at the end,
//! so every read during the operation sees an untouched tree.

use crate::Result;
use doc_model::{DocumentTree, NodeId};
use std::collections::HashMap;

/// A queued change to one cell
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// Detach the cell from its row
    Remove,
    /// Set `rowspan`, dropping the attribute when the value is 1 or less
    RowSpan(u32),
    /// Set `colspan`, dropping the attribute when the value is 1 or less
    ColSpan(u32),
    /// Set the inline `width` style
    Width(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WriteKey {
    Remove,
    RowSpan,
    ColSpan,
    Width,
}

impl PendingWrite {
    fn key(&self) -> WriteKey {
        match self {
            PendingWrite::Remove => WriteKey::Remove,
            PendingWrite::RowSpan(_) => WriteKey::RowSpan,
            PendingWrite::ColSpan(_) => WriteKey::ColSpan,
            PendingWrite::Width(_) => WriteKey::Width,
        }
    }
}

/// Side table of queued writes, keyed by cell identity.
///
/// Marking the same key twice for a cell keeps the latest value in the
/// position of the first mark. Cells are committed in the order they were
/// first marked.
#[derive(Debug, Default)]
pub struct PendingMarks {
    order: Vec<NodeId>,
    writes: HashMap<NodeId, Vec<PendingWrite>>,
}

impl PendingMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write for a cell
    pub fn mark(&mut self, cell: NodeId, write: PendingWrite) {
        let writes = self.writes.entry(cell).or_insert_with(|| {
            self.order.push(cell);
            Vec::new()
        });
        match writes.iter_mut().find(|w| w.key() == write.key()) {
            Some(existing) => *existing = write,
            None => writes.push(write),
        }
    }

    /// The queued value for a cell's row span, if any
    pub fn pending_row_span(&self, cell: NodeId) -> Option<u32> {
        self.writes.get(&cell)?.iter().find_map(|w| match w {
            PendingWrite::RowSpan(v) => Some(*v),
            _ => None,
        })
    }

    /// The queued value for a cell's column span, if any
    pub fn pending_col_span(&self, cell: NodeId) -> Option<u32> {
        self.writes.get(&cell)?.iter().find_map(|w| match w {
            PendingWrite::ColSpan(v) => Some(*v),
            _ => None,
        })
    }

    /// Whether a cell is queued for removal
    pub fn is_removed(&self, cell: NodeId) -> bool {
        self.writes
            .get(&cell)
            .is_some_and(|w| w.contains(&PendingWrite::Remove))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of cells with queued writes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Apply every queued write and clear the queue.
    ///
    /// Writes to cells that no longer exist in the tree are skipped.
    pub fn commit(&mut self, tree: &mut DocumentTree) -> Result<()> {
        let order = std::mem::take(&mut self.order);
        let mut writes = std::mem::take(&mut self.writes);

        for cell in order {
            let Some(cell_writes) = writes.remove(&cell) else {
                continue;
            };
            for write in cell_writes {
                if !tree.contains(cell) {
                    break;
                }
                match write {
                    PendingWrite::Remove => {
                        tree.remove(cell)?;
                    }
                    PendingWrite::RowSpan(value) => set_span(tree, cell, "rowspan", value)?,
                    PendingWrite::ColSpan(value) => set_span(tree, cell, "colspan", value)?,
                    PendingWrite::Width(value) => tree.set_style(cell, "width", value)?,
                }
            }
        }

        Ok(())
    }
}

/// Write a span attribute, removing it when the span is 1 or less
pub(crate) fn set_span(tree: &mut DocumentTree, cell: NodeId, name: &str, value: u32) -> Result<()> {
    if value > 1 {
        tree.set_attribute(cell, name, value.to_string())?;
    } else {
        tree.remove_attribute(cell, name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::TableBuilder;

    #[test]
    fn test_writes_are_deferred_until_commit() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 2).build(&mut tree, root).unwrap();
        let [a, b] = [built.cells[0][0], built.cells[0][1]];

        let mut marks = PendingMarks::new();
        marks.mark(a, PendingWrite::ColSpan(3));
        marks.mark(b, PendingWrite::Remove);
        assert!(!tree.has_attribute(a, "colspan"));
        assert!(tree.contains(b));
        assert_eq!(marks.len(), 2);

        marks.commit(&mut tree).unwrap();
        assert_eq!(tree.attribute(a, "colspan"), Some("3"));
        assert!(!tree.contains(b));
        assert!(marks.is_empty());
    }

    #[test]
    fn test_latest_value_wins() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 1).build(&mut tree, root).unwrap();
        let a = built.cells[0][0];

        let mut marks = PendingMarks::new();
        marks.mark(a, PendingWrite::RowSpan(4));
        marks.mark(a, PendingWrite::Width("10%".into()));
        marks.mark(a, PendingWrite::RowSpan(2));
        assert_eq!(marks.pending_row_span(a), Some(2));
        assert_eq!(marks.pending_col_span(a), None);

        marks.commit(&mut tree).unwrap();
        assert_eq!(tree.attribute(a, "rowspan"), Some("2"));
        assert_eq!(tree.style(a, "width"), Some("10%"));
    }

    #[test]
    fn test_span_of_one_drops_attribute() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 1).build(&mut tree, root).unwrap();
        let a = built.cells[0][0];
        tree.set_attribute(a, "colspan", "2").unwrap();

        let mut marks = PendingMarks::new();
        marks.mark(a, PendingWrite::ColSpan(1));
        marks.commit(&mut tree).unwrap();
        assert!(!tree.has_attribute(a, "colspan"));
    }

    #[test]
    fn test_writes_after_remove_are_skipped() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let built = TableBuilder::grid(1, 1).build(&mut tree, root).unwrap();
        let a = built.cells[0][0];

        let mut marks = PendingMarks::new();
        marks.mark(a, PendingWrite::Remove);
        marks.mark(a, PendingWrite::Width("50%".into()));
        assert!(marks.is_removed(a));
        marks.commit(&mut tree).unwrap();
        assert!(!tree.contains(a));
    }
}
