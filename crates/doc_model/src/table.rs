//! Table accessors - rows, cells, and span attributes
//!
//! This module reads the table structure the way a browser reflects it:
//! - `table_rows` follows `HTMLTableElement.rows` ordering (head rows, body
//!   rows and bare `tr` children in document order, foot rows)
//! - `col_span` / `row_span` follow `colSpan` / `rowSpan` reflection, so a
//!   missing, malformed or zero attribute reads as 1
//!
//! It also provides [`TableBuilder`] for assembling tables from span specs.

use crate::{DocModelError, DocumentTree, NodeId, Result};

/// Upper bound for reflected `colSpan`
pub const MAX_COL_SPAN: u32 = 1000;

/// Upper bound for reflected `rowSpan`
pub const MAX_ROW_SPAN: u32 = 65534;

// =============================================================================
// Span attributes
// =============================================================================

/// Parse a span attribute value with browser leniency: leading digits are
/// taken, anything unparseable or zero becomes 1.
fn parse_span(value: Option<&str>, max: u32) -> u32 {
    let Some(value) = value else {
        return 1;
    };
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u64>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => n.min(u64::from(max)) as u32,
    }
}

/// Reflected column span of a cell
pub fn col_span(tree: &DocumentTree, cell: NodeId) -> u32 {
    parse_span(tree.attribute(cell, "colspan"), MAX_COL_SPAN)
}

/// Reflected row span of a cell
pub fn row_span(tree: &DocumentTree, cell: NodeId) -> u32 {
    parse_span(tree.attribute(cell, "rowspan"), MAX_ROW_SPAN)
}

// =============================================================================
// Structure
// =============================================================================

fn ensure_table(tree: &DocumentTree, table: NodeId) -> Result<()> {
    let element = tree.element(table)?;
    if !element.is_table() {
        return Err(DocModelError::InvalidOperation(format!(
            "expected <table>, found <{}>",
            element.tag()
        )));
    }
    Ok(())
}

fn section_rows(tree: &DocumentTree, section: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(section)
        .iter()
        .copied()
        .filter(|&id| tree.get(id).is_some_and(|e| e.is_row()))
}

/// Rows of a table in `table.rows` order
pub fn table_rows(tree: &DocumentTree, table: NodeId) -> Result<Vec<NodeId>> {
    ensure_table(tree, table)?;

    let children = tree.children(table);
    let tagged = |tag: &'static str| {
        children
            .iter()
            .copied()
            .filter(move |&id| tree.get(id).is_some_and(|e| e.tag() == tag))
    };

    let mut rows: Vec<NodeId> = tagged("thead").flat_map(|s| section_rows(tree, s)).collect();

    for &child in children {
        let Some(element) = tree.get(child) else {
            continue;
        };
        match element.tag() {
            "tr" => rows.push(child),
            "tbody" => rows.extend(section_rows(tree, child)),
            _ => {}
        }
    }

    rows.extend(tagged("tfoot").flat_map(|s| section_rows(tree, s)));
    Ok(rows)
}

/// Number of rows in a table
pub fn row_count(tree: &DocumentTree, table: NodeId) -> Result<usize> {
    Ok(table_rows(tree, table)?.len())
}

/// Cells of a row in document order
pub fn row_cells(tree: &DocumentTree, row: NodeId) -> Vec<NodeId> {
    tree.children(row)
        .iter()
        .copied()
        .filter(|&id| tree.get(id).is_some_and(|e| e.is_cell()))
        .collect()
}

/// Index of a row within `table.rows`
pub fn row_index(tree: &DocumentTree, table: NodeId, row: NodeId) -> Option<usize> {
    table_rows(tree, table).ok()?.iter().position(|&r| r == row)
}

/// The table a row or cell belongs to
pub fn owning_table(tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
    let parent = tree.parent(node)?;
    tree.closest(parent, |e| e.is_table(), None)
}

/// The row hosting a cell
pub fn owning_row(tree: &DocumentTree, cell: NodeId) -> Option<NodeId> {
    tree.parent(cell).filter(|&p| tree.get(p).is_some_and(|e| e.is_row()))
}

/// First `tbody` child of a table
pub fn body_section(tree: &DocumentTree, table: NodeId) -> Option<NodeId> {
    tree.children(table)
        .iter()
        .copied()
        .find(|&id| tree.get(id).is_some_and(|e| e.tag() == "tbody"))
}

// =============================================================================
// Table Builder
// =============================================================================

/// Description of a cell for [`TableBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub content: String,
    pub col_span: u32,
    pub row_span: u32,
    /// Emit `<th>` instead of `<td>`
    pub header: bool,
}

impl CellSpec {
    /// A plain cell with content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            col_span: 1,
            row_span: 1,
            header: false,
        }
    }

    /// Set the spans of the cell
    pub fn span(mut self, col_span: u32, row_span: u32) -> Self {
        self.col_span = col_span;
        self.row_span = row_span;
        self
    }

    /// Make this a header cell
    pub fn header(mut self) -> Self {
        self.header = true;
        self
    }
}

impl From<&str> for CellSpec {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

/// Ids of a table assembled by [`TableBuilder`]
#[derive(Debug, Clone)]
pub struct BuiltTable {
    pub table: NodeId,
    /// The `tbody` when one was requested
    pub body: Option<NodeId>,
    pub rows: Vec<NodeId>,
    /// Cell ids per row, in document order
    pub cells: Vec<Vec<NodeId>>,
}

/// Assembles a table element tree from rows of [`CellSpec`]s
#[derive(Debug, Clone)]
pub struct TableBuilder {
    rows: Vec<Vec<CellSpec>>,
    with_body: bool,
    width: Option<String>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            with_body: true,
            width: None,
        }
    }

    /// A plain `rows x cols` table whose cells contain `"r,c"`
    pub fn grid(rows: usize, cols: usize) -> Self {
        (0..rows).fold(Self::new(), |builder, r| {
            builder.row((0..cols).map(|c| CellSpec::new(format!("{},{}", r, c))))
        })
    }

    /// Append a row
    pub fn row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellSpec>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Whether rows are wrapped in a `tbody` (the default)
    pub fn with_body(mut self, with_body: bool) -> Self {
        self.with_body = with_body;
        self
    }

    /// Inline CSS width of the table, e.g. `"600px"`
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Create the table and append it to `parent`
    pub fn build(self, tree: &mut DocumentTree, parent: NodeId) -> Result<BuiltTable> {
        let table = tree.create_element("table");
        if let Some(width) = &self.width {
            tree.set_style(table, "width", width.as_str())?;
        }
        tree.append_child(parent, table)?;

        let body = if self.with_body {
            let tbody = tree.create_element("tbody");
            tree.append_child(table, tbody)?;
            Some(tbody)
        } else {
            None
        };
        let host = body.unwrap_or(table);

        let mut rows = Vec::with_capacity(self.rows.len());
        let mut cells = Vec::with_capacity(self.rows.len());
        for specs in self.rows {
            let tr = tree.create_element("tr");
            tree.append_child(host, tr)?;

            let mut row_cells = Vec::with_capacity(specs.len());
            for spec in specs {
                let cell = tree.create_element(if spec.header { "th" } else { "td" });
                if spec.col_span > 1 {
                    tree.set_attribute(cell, "colspan", spec.col_span.to_string())?;
                }
                if spec.row_span > 1 {
                    tree.set_attribute(cell, "rowspan", spec.row_span.to_string())?;
                }
                tree.set_inner_html(cell, spec.content)?;
                tree.append_child(tr, cell)?;
                row_cells.push(cell);
            }

            rows.push(tr);
            cells.push(row_cells);
        }

        Ok(BuiltTable {
            table,
            body,
            rows,
            cells,
        })
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
