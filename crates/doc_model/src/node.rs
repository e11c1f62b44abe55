//! Node identities, node classification, and the element record

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for an element in a [`DocumentTree`](crate::DocumentTree).
///
/// Two handles refer to the same element iff their ids are equal; element
/// identity never depends on the element's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Classification of elements by their role in table structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// `<table>`
    Table,
    /// `<thead>`, `<tbody>` or `<tfoot>`
    TableSection,
    /// `<tr>`
    TableRow,
    /// `<td>` or `<th>`
    TableCell,
    /// Any other element
    Element,
}

impl NodeType {
    /// Classify a lower-case tag name
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "table" => NodeType::Table,
            "thead" | "tbody" | "tfoot" => NodeType::TableSection,
            "tr" => NodeType::TableRow,
            "td" | "th" => NodeType::TableCell,
            _ => NodeType::Element,
        }
    }
}

/// Common interface for tree nodes
pub trait Node: std::fmt::Debug {
    /// Get the unique ID of this node
    fn id(&self) -> NodeId;

    /// Get the type of this node
    fn node_type(&self) -> NodeType;

    /// Get the IDs of child nodes
    fn children(&self) -> &[NodeId];

    /// Get the ID of the parent node (None when detached)
    fn parent(&self) -> Option<NodeId>;

    /// Check if this node can have element children
    fn can_have_children(&self) -> bool;
}

/// Tags that never carry content or children
const VOID_TAGS: &[&str] = &["br", "col", "hr", "img", "input", "meta", "link", "wbr"];

/// An element in the document tree.
///
/// Structural elements (`table`, sections, rows) hold element children.
/// Leaf elements such as cells hold their content as a markup string, which
/// the table engine moves around verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tag: String,
    /// Attributes other than `style`
    attributes: BTreeMap<String, String>,
    /// Inline style declarations in insertion order
    style: Vec<(String, String)>,
    /// Markup content of leaf elements
    content: String,
}

impl Element {
    /// Create a detached element with the given tag
    pub fn new(tag: &str) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            style: Vec::new(),
            content: String::new(),
        }
    }

    /// Lower-case tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether this is a void element (`<br>`, `<img>`, ...)
    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_table(&self) -> bool {
        self.node_type() == NodeType::Table
    }

    pub fn is_row(&self) -> bool {
        self.node_type() == NodeType::TableRow
    }

    pub fn is_cell(&self) -> bool {
        self.node_type() == NodeType::TableCell
    }

    pub fn is_section(&self) -> bool {
        self.node_type() == NodeType::TableSection
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        if name == "style" {
            return None;
        }
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        if name == "style" {
            return !self.style.is_empty();
        }
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            self.style = parse_style(&value.into());
        } else {
            self.attributes.insert(name, value.into());
        }
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        if name == "style" {
            let previous = serialize_style(&self.style);
            self.style.clear();
            return (!previous.is_empty()).then_some(previous);
        }
        self.attributes.remove(name)
    }

    /// Iterate over attributes (excluding `style`) in lexical order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get an inline style property
    pub fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.remove_style(property);
            return;
        }
        match self.style.iter_mut().find(|(name, _)| name == property) {
            Some(entry) => entry.1 = value,
            None => self.style.push((property.to_string(), value)),
        }
    }

    pub fn remove_style(&mut self, property: &str) {
        self.style.retain(|(name, _)| name != property);
    }

    /// Serialized `style` attribute value, empty when no declarations exist
    pub fn style_attribute(&self) -> String {
        serialize_style(&self.style)
    }

    /// Markup content of a leaf element
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    /// Parent links are written by the tree only
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

impl Node for Element {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::from_tag(&self.tag)
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn can_have_children(&self) -> bool {
        !self.is_void()
    }
}

fn parse_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            (!name.is_empty() && !value.is_empty()).then(|| (name, value.to_string()))
        })
        .collect()
}

fn serialize_style(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}
