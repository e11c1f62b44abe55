//! Merging selected cells

use crate::bound::selected_bound;
use crate::marks::{PendingMarks, PendingWrite};
use crate::matrix;
use crate::{Metrics, Result, TableEngine};
use doc_model::{DocumentTree, NodeId};
use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, warn};

fn line_break_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)<br\s*/?>").ok())
        .as_ref()
}

/// Whether markup holds nothing but whitespace and bare line breaks
pub fn is_blank_markup(html: &str) -> bool {
    match line_break_pattern() {
        Some(pattern) => pattern.replace_all(html, "").trim().is_empty(),
        None => html.trim().is_empty(),
    }
}

impl<M: Metrics> TableEngine<M> {
    /// Merge the selected cells of a table into one.
    ///
    /// The selection is widened to its span-aware bound. The first cell of
    /// the bound in row-major order survives, takes the bound's size and
    /// receives the non-blank content of every merged cell. Returns the
    /// surviving cell, or `None` when the bound covers at most one slot.
    pub fn merge_selected(&self, tree: &mut DocumentTree, table: NodeId) -> Result<Option<NodeId>> {
        let selected = self.get_all_selected_cells(tree, table)?;
        let matrix = matrix::formal_matrix(tree, table)?;
        let Some(bound) = selected_bound(&matrix, &selected) else {
            return Ok(None);
        };
        if bound.is_single_slot() {
            return Ok(None);
        }

        let mut marks = PendingMarks::new();
        let mut seen = HashSet::new();
        let mut survivor: Option<(NodeId, usize)> = None;
        let mut parts = Vec::new();
        let mut width = 0.0;
        let mut removed = 0;

        for i in bound.top..=bound.bottom {
            for j in bound.left..=bound.right {
                let Some(cell) = matrix.get(i, j) else {
                    warn!(%table, row = i, col = j, "skipping hole in malformed table");
                    continue;
                };
                if !seen.insert(cell) {
                    continue;
                }

                if i == bound.top && tree.style(cell, "width").is_some() {
                    width += self.metrics().cell_width(tree, table, cell);
                }

                let html = tree.inner_html(cell)?;
                if !is_blank_markup(&html) {
                    parts.push(html);
                }

                if survivor.is_none() {
                    survivor = Some((cell, j));
                } else {
                    marks.mark(cell, PendingWrite::Remove);
                    removed += 1;
                }
            }
        }

        let Some((first, first_col)) = survivor else {
            return Ok(None);
        };

        marks.mark(first, PendingWrite::ColSpan(bound.width() as u32));
        marks.mark(first, PendingWrite::RowSpan(bound.height() as u32));

        if width > 0.0 {
            if first_col != 0 {
                self.queue_column_width(tree, table, &matrix, first_col, 0.0, &mut marks)?;
            }
            if let Some(percent) = self.percent_of_table(tree, table, width) {
                marks.mark(first, PendingWrite::Width(percent));
            }
        }

        tree.set_inner_html(first, parts.join(self.config().merge_separator.as_str()))?;
        marks.commit(tree)?;
        self.normalize_table(tree, table)?;

        debug!(
            %table,
            cell = %first,
            bound = ?bound.as_pairs(),
            removed,
            "merged cells"
        );
        Ok(Some(first))
    }
}
