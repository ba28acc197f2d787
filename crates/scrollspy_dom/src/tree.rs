//! Element tree management
//!
//! Elements live in a slotmap and reference each other by [`ElementId`].
//! Geometry is written by the host's layout pass and only read here: the
//! tree never computes offsets itself, it just answers offset-parent and
//! containment queries over what it was given.

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{DomError, Result};

new_key_type! {
    pub struct ElementId;
}

/// CSS positioning scheme of an element
///
/// Anything other than `Static` establishes a positioning context and can
/// therefore act as an offset parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    pub fn is_positioned(self) -> bool {
        !matches!(self, Position::Static)
    }
}

/// Pre-computed box geometry for an element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    /// Top offset relative to the offset parent (NaN when unknown)
    pub offset_top: f32,
    /// Border-box height
    pub offset_height: f32,
    /// Current vertical scroll offset of the element's content
    pub scroll_top: f32,
    /// Total height of the element's scrollable content
    pub scroll_height: f32,
}

/// A single element in the tree
#[derive(Debug, Clone)]
pub struct ElementNode {
    tag: String,
    id: Option<String>,
    classes: SmallVec<[String; 4]>,
    attributes: IndexMap<String, String>,
    position: Position,
    geometry: Geometry,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl ElementNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: SmallVec::new(),
            attributes: IndexMap::new(),
            position: Position::Static,
            geometry: Geometry::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The element's `id` attribute, if any
    pub fn id_attr(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Retained tree of elements rooted at a `body` element
pub struct ElementTree {
    nodes: SlotMap<ElementId, ElementNode>,
    root: ElementId,
}

impl ElementTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementNode::new("body"));
        Self { nodes, root }
    }

    /// The root (`body`) element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(ElementNode::new(tag))
    }

    /// Start building a new element
    pub fn element(&mut self, tag: &str) -> ElementBuilder<'_> {
        let id = self.create_element(tag);
        ElementBuilder { tree: self, id }
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(DomError::UnknownElement(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(DomError::UnknownElement(child));
        }
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::Hierarchy { parent, child });
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    fn detach(&mut self, child: ElementId) {
        let Some(old_parent) = self.nodes.get_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(old_parent) {
            parent.children.retain(|&c| c != child);
        }
    }

    /// Remove an element and its whole subtree
    pub fn remove(&mut self, id: ElementId) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(DomError::UnknownElement(id));
        }
        if id == self.root {
            return Err(DomError::Hierarchy {
                parent: self.root,
                child: id,
            });
        }
        self.detach(id);
        for node in self.descendants(id) {
            self.nodes.remove(node);
        }
        self.nodes.remove(id);
        Ok(())
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(id)
    }

    /// Check if an element exists (attached or not)
    pub fn exists(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Check if an element is attached under the root
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.exists(id) && (id == self.root || self.ancestors(id).any(|a| a == self.root))
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Iterate ancestors from the immediate parent up to the root
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Check if `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// All descendants of `id` in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    // =========================================================================
    // Classes and attributes
    // =========================================================================

    /// Add a class; returns true if the class was not already present
    pub fn add_class(&mut self, id: ElementId, class: &str) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if class.is_empty() || node.has_class(class) {
            return false;
        }
        node.classes.push(class.to_string());
        true
    }

    /// Remove a class; returns true if it was present
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        node.classes.len() != before
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.has_class(class))
    }

    pub fn set_id_attr(&mut self, id: ElementId, value: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.id = Some(value.to_string());
        }
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.attribute(name))
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn set_position(&mut self, id: ElementId, position: Position) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.position = position;
        }
    }

    pub fn geometry(&self, id: ElementId) -> Option<&Geometry> {
        self.nodes.get(id).map(ElementNode::geometry)
    }

    pub fn geometry_mut(&mut self, id: ElementId) -> Option<&mut Geometry> {
        self.nodes.get_mut(id).map(|n| &mut n.geometry)
    }

    /// Nearest positioned ancestor, falling back to the root
    ///
    /// Returns `None` for the root itself, for fixed-position elements and
    /// for elements that are not attached to the tree.
    pub fn offset_parent(&self, id: ElementId) -> Option<ElementId> {
        let node = self.nodes.get(id)?;
        if id == self.root || node.position == Position::Fixed || !self.is_connected(id) {
            return None;
        }
        self.ancestors(id).find(|&ancestor| {
            ancestor == self.root
                || self
                    .nodes
                    .get(ancestor)
                    .is_some_and(|n| n.position.is_positioned())
        })
    }

    /// Number of elements, including the root and detached elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned by [`ElementTree::element`]
pub struct ElementBuilder<'a> {
    tree: &'a mut ElementTree,
    id: ElementId,
}

impl ElementBuilder<'_> {
    /// Set the `id` attribute
    pub fn id(self, value: &str) -> Self {
        self.tree.set_id_attr(self.id, value);
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.tree.add_class(self.id, class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.tree.set_attribute(self.id, name, value);
        self
    }

    pub fn position(self, position: Position) -> Self {
        self.tree.set_position(self.id, position);
        self
    }

    pub fn offset_top(self, offset_top: f32) -> Self {
        if let Some(g) = self.tree.geometry_mut(self.id) {
            g.offset_top = offset_top;
        }
        self
    }

    pub fn height(self, offset_height: f32) -> Self {
        if let Some(g) = self.tree.geometry_mut(self.id) {
            g.offset_height = offset_height;
        }
        self
    }

    pub fn scroll_height(self, scroll_height: f32) -> Self {
        if let Some(g) = self.tree.geometry_mut(self.id) {
            g.scroll_height = scroll_height;
        }
        self
    }

    /// Finish without attaching
    pub fn build(self) -> ElementId {
        self.id
    }

    /// Finish and append to `parent`
    ///
    /// The element stays detached (and a warning is logged) if `parent` is
    /// not a live element.
    pub fn append_to(self, parent: ElementId) -> ElementId {
        if let Err(err) = self.tree.append_child(parent, self.id) {
            tracing::warn!("ElementBuilder: {}", err);
        }
        self.id
    }
}
