//! Document tree storage and structural operations

use crate::{DocModelError, Element, Node, NodeId, Result, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An element tree owning every element created through it.
///
/// Elements live in an arena keyed by [`NodeId`]. Detached elements (freshly
/// created or moved out of the tree) stay in the arena until they are
/// [`remove`](DocumentTree::remove)d, so they can be reinserted later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    root: NodeId,
    nodes: HashMap<NodeId, Element>,
}

impl DocumentTree {
    /// Create an empty tree with a `body` root
    pub fn new() -> Self {
        let body = Element::new("body");
        let root = body.id();
        let mut nodes = HashMap::new();
        nodes.insert(root, body);
        Self { root, nodes }
    }

    /// The root element id
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of elements owned by this tree, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(&id)
    }

    /// Get an element or fail with `NodeNotFound`
    pub fn element(&self, id: NodeId) -> Result<&Element> {
        self.nodes.get(&id).ok_or(DocModelError::NodeNotFound(id.as_uuid()))
    }

    /// Get a mutable element or fail with `NodeNotFound`
    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.nodes
            .get_mut(&id)
            .ok_or(DocModelError::NodeNotFound(id.as_uuid()))
    }

    /// Create a detached element owned by this document
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let element = Element::new(tag);
        let id = element.id();
        self.nodes.insert(id, element);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|e| e.parent())
    }

    /// Child ids of an element (empty when the element does not exist)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|e| e.children()).unwrap_or(&[])
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let first = self.children(parent).first().copied();
        self.insert_before(parent, child, first)
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if reference == Some(child) {
            return Ok(());
        }
        self.check_insertable(parent, child)?;
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DocModelError::TreeStructureError(format!(
                    "{} is not a child of {}",
                    reference, parent
                )));
            }
        }

        self.detach(child)?;

        let parent_el = self.element_mut(parent)?;
        let index = match reference {
            Some(reference) => parent_el
                .children()
                .iter()
                .position(|&id| id == reference)
                .unwrap_or(parent_el.children().len()),
            None => parent_el.children().len(),
        };
        parent_el.children_mut().insert(index, child);
        self.element_mut(child)?.set_parent(Some(parent));
        Ok(())
    }

    /// Insert `child` immediately after `reference` in the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let parent = self.parent(reference).ok_or_else(|| {
            DocModelError::InvalidOperation(format!("{} has no parent", reference))
        })?;
        let next = self.next_sibling(reference);
        self.insert_before(parent, child, next)
    }

    /// Detach an element from its parent, keeping it in the arena.
    /// Detaching an already detached element is a no-op.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.element(id)?.parent();
        if let Some(parent) = parent {
            if let Some(parent_el) = self.nodes.get_mut(&parent) {
                parent_el.children_mut().retain(|&c| c != id);
            }
            self.element_mut(id)?.set_parent(None);
        }
        Ok(())
    }

    /// Detach an element and drop it together with its descendants
    pub fn remove(&mut self, id: NodeId) -> Result<Element> {
        if id == self.root {
            return Err(DocModelError::InvalidOperation(
                "cannot remove the root element".to_string(),
            ));
        }
        self.detach(id)?;
        let element = self
            .nodes
            .remove(&id)
            .ok_or(DocModelError::NodeNotFound(id.as_uuid()))?;

        let mut pending: Vec<NodeId> = element.children().to_vec();
        while let Some(next) = pending.pop() {
            if let Some(descendant) = self.nodes.remove(&next) {
                pending.extend_from_slice(descendant.children());
            }
        }
        Ok(element)
    }

    /// The following sibling of an element
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// The preceding sibling of an element
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    /// First following sibling matching `predicate`
    pub fn next_matching_sibling<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = self.next_sibling(id);
        while let Some(candidate) = current {
            if self.nodes.get(&candidate).is_some_and(&predicate) {
                return Some(candidate);
            }
            current = self.next_sibling(candidate);
        }
        None
    }

    /// Nearest ancestor (starting with the element itself) matching
    /// `predicate`, not looking above `boundary` when given
    pub fn closest<F>(&self, id: NodeId, predicate: F, boundary: Option<NodeId>) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = Some(id);
        while let Some(candidate) = current {
            let element = self.nodes.get(&candidate)?;
            if predicate(element) {
                return Some(candidate);
            }
            if Some(candidate) == boundary {
                return None;
            }
            current = element.parent();
        }
        None
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// All descendants of `root` (excluding `root`) in document order
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` matching a selector, in document order
    pub fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|e| selector.matches(e)))
            .collect()
    }

    /// First descendant of `root` matching a selector
    pub fn query_first(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(root, selector).into_iter().next()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(&id).and_then(|e| e.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.nodes.get(&id).is_some_and(|e| e.has_attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<()> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.element_mut(id)?.remove_attribute(name))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(&id).and_then(|e| e.style(property))
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) -> Result<()> {
        self.element_mut(id)?.set_style(property, value);
        Ok(())
    }

    /// Inner markup of an element: its content for leaf elements, the
    /// serialized children otherwise
    pub fn inner_html(&self, id: NodeId) -> Result<String> {
        let element = self.element(id)?;
        if element.children().is_empty() {
            return Ok(element.content().to_string());
        }
        let mut out = String::new();
        for &child in element.children() {
            crate::html::write_element(self, child, &mut out)?;
        }
        Ok(out)
    }

    /// Replace the content of an element, dropping any element children
    pub fn set_inner_html(&mut self, id: NodeId, html: impl Into<String>) -> Result<()> {
        let children = self.element(id)?.children().to_vec();
        for child in children {
            self.remove(child)?;
        }
        self.element_mut(id)?.set_content(html);
        Ok(())
    }

    /// Serialized markup of an element including its own tag
    pub fn outer_html(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        crate::html::write_element(self, id, &mut out)?;
        Ok(out)
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_el = self.element(parent)?;
        self.element(child)?;
        if !parent_el.can_have_children() {
            return Err(DocModelError::TreeStructureError(format!(
                "<{}> cannot have children",
                parent_el.tag()
            )));
        }
        if child == self.root {
            return Err(DocModelError::TreeStructureError(
                "cannot move the root element".to_string(),
            ));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DocModelError::TreeStructureError(format!(
                "{} would become its own descendant",
                child
            )));
        }
        Ok(())
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
