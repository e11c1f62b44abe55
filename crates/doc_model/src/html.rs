//! Markup serialization

use crate::{DocumentTree, Node, NodeId, Result};
use std::fmt::Write;

/// Escape an attribute value for double-quoted output
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Append the markup of `id` and its subtree to `out`.
///
/// Attributes are written in lexical order followed by `style`, so output is
/// stable across runs. Leaf content is written verbatim.
pub(crate) fn write_element(tree: &DocumentTree, id: NodeId, out: &mut String) -> Result<()> {
    let element = tree.element(id)?;

    out.push('<');
    out.push_str(element.tag());
    for (name, value) in element.attributes() {
        // Writing to a String cannot fail.
        let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
    }
    let style = element.style_attribute();
    if !style.is_empty() {
        let _ = write!(out, " style=\"{}\"", escape_attribute(&style));
    }
    out.push('>');

    if element.is_void() {
        return Ok(());
    }

    if element.children().is_empty() {
        out.push_str(element.content());
    } else {
        for &child in element.children() {
            write_element(tree, child, out)?;
        }
    }

    let _ = write!(out, "</{}>", element.tag());
    Ok(())
}
