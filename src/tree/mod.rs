//! Arena-based document tree.
//!
//! All nodes live in a contiguous `Vec<NodeData>` owned by the [`Document`]
//! and are referenced by [`NodeId`], a newtype over `NonZeroU32`. Parent
//! links are plain ids: they relate a node to its owner without owning it,
//! so the tree has no reference cycles and dropping the `Document` frees
//! every node at once.
//!
//! A document may hold several independent trees. Nodes created with
//! [`Document::create_element`] or [`Document::create_text`] start out
//! parentless and become part of a tree when appended to an element.
//! [`Document::root_element`] names the tree produced by parsing.
//!
//! Attribute access lives in `attributes.rs` and structural edits in
//! `mutate.rs`; both extend `Document` with further `impl` blocks.

mod attributes;
mod mutate;
mod node;

pub use attributes::numeric_prefix;
pub use node::{Attribute, NodeKind};

use crate::error::TreeError;
use crate::parser::{self, ParseOptions};
use std::num::NonZeroU32;
use std::path::Path;

/// A typed index into the document's node arena.
///
/// `NodeId` is a newtype over `NonZeroU32`, so `Option<NodeId>` has the same
/// size as `NodeId`. Ids are only meaningful for the `Document` that issued
/// them; using one with another document panics or addresses the wrong node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 0.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32).expect("NodeId index must be non-zero"))
    }

    /// Returns the raw index as a `usize` for indexing into the arena.
    fn as_index(self) -> usize {
        self.0.get() as usize
    }

    /// Converts this `NodeId` to its raw `u32` value (always non-zero).
    #[must_use]
    pub fn into_raw(self) -> u32 {
        self.0.get()
    }

    /// Creates a `NodeId` from a raw `u32`, if non-zero.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Element or text, with its payload.
    pub kind: NodeKind,
    /// The element this node is attached to. `None` for roots and for
    /// nodes that were never attached or have been replaced away.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// A node arena together with the root of its parsed tree.
///
/// Navigation goes through `&Document` and mutation through
/// `&mut Document`; the borrow checker therefore rules out editing a tree
/// while a traversal of it is in progress.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
///
/// let mut doc = Document::new();
/// let list = doc.create_element("list").unwrap();
/// let item = doc.create_element("item").unwrap();
/// doc.append_child(list, item).unwrap();
/// assert_eq!(doc.parent(item), Some(list));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The root element of the parsed tree, if any.
    root: Option<NodeId>,
}

impl Document {
    /// Creates an empty document with no nodes.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        // Index 0: placeholder (NodeId uses NonZeroU32)
        nodes.push(NodeData::new(NodeKind::Text {
            content: String::new(),
        }));
        Self { nodes, root: None }
    }

    /// Parses a markup string into a `Document` with default options.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedDocument`](crate::ErrorKind::MalformedDocument)
    /// error if the input does not describe exactly one well-formed root
    /// element.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let doc = Document::parse_str("<root><child/></root>").unwrap();
    /// assert!(doc.root_element().is_some());
    /// ```
    pub fn parse_str(input: &str) -> Result<Self, TreeError> {
        parser::parse_str(input)
    }

    /// Parses a markup string with the given options.
    ///
    /// # Errors
    ///
    /// Same as [`parse_str`](Self::parse_str), plus depth-limit violations.
    pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Self, TreeError> {
        parser::parse_str_with_options(input, options)
    }

    /// Parses raw bytes, detecting and transcoding the character encoding.
    ///
    /// # Errors
    ///
    /// Returns an [`Encoding`](crate::ErrorKind::Encoding) error if the bytes
    /// cannot be decoded, or a parse error as for [`parse_str`](Self::parse_str).
    pub fn parse_bytes(input: &[u8]) -> Result<Self, TreeError> {
        parser::parse_bytes_with_options(input, &ParseOptions::default())
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`Io`](crate::ErrorKind::Io) error if the file cannot be
    /// read, otherwise as for [`parse_bytes`](Self::parse_bytes).
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        parser::parse_file_with_options(path, &ParseOptions::default())
    }

    /// Returns the root element of the parsed tree.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.root
    }

    /// Records `id` as the document's root element.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// error if `id` is not an element or is attached to a parent.
    pub fn set_root_element(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.is_element(id) {
            return Err(TreeError::invalid_operation(
                "the root must be an element node",
            ));
        }
        if self.parent(id).is_some() {
            return Err(TreeError::invalid_operation(
                "the root element cannot have a parent",
            ));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Returns a reference to the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a valid node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    /// Returns a mutable reference to the `NodeData` for the given node.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    // --- Construction ---

    /// Allocates a new, parentless node in the arena.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// error for an element kind with an empty name.
    pub fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, TreeError> {
        if let NodeKind::Element { name, .. } = &kind {
            if name.is_empty() {
                return Err(TreeError::invalid_operation(
                    "element names must not be empty",
                ));
            }
        }
        Ok(self.alloc(kind))
    }

    /// Creates a parentless element with no attributes and no children.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// error if `name` is empty.
    pub fn create_element(&mut self, name: &str) -> Result<NodeId, TreeError> {
        self.create_node(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Creates a parentless text node holding `content` verbatim.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(NodeKind::Text {
            content: content.to_string(),
        })
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    // --- Identity ---

    /// Returns `true` if the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).kind.is_element()
    }

    /// Returns the tag name of an element, or `None` for a text node.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text { .. } => None,
        }
    }

    /// Returns `true` if the node is an element named `tag`.
    ///
    /// Always `false` for text nodes and for an empty `tag`.
    #[must_use]
    pub fn is_named(&self, id: NodeId, tag: &str) -> bool {
        !tag.is_empty() && self.node_name(id) == Some(tag)
    }

    /// Returns the content of a text node, or `None` for an element.
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { content } => Some(content),
            NodeKind::Element { .. } => None,
        }
    }

    /// Returns the concatenated text content of a node and all its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text { content } => buf.push_str(content),
            NodeKind::Element { .. } => {
                for child in self.children(id) {
                    self.collect_text(child, buf);
                }
            }
        }
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over all children (elements and text) in order.
    ///
    /// Text nodes have no children, so the iterator is empty for them.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns an iterator over the element children of a node, optionally
    /// restricted to those named `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let doc = Document::parse_str("<a><b/>text<c/><b/></a>").unwrap();
    /// let root = doc.root_element().unwrap();
    /// assert_eq!(doc.elements(root, None).count(), 3);
    /// assert_eq!(doc.elements(root, Some("b")).count(), 2);
    /// ```
    pub fn elements<'a>(&'a self, id: NodeId, name: Option<&'a str>) -> Elements<'a> {
        Elements {
            children: self.children(id),
            name,
        }
    }

    /// Returns the first element child, optionally restricted to `name`.
    #[must_use]
    pub fn first_element(&self, id: NodeId, name: Option<&str>) -> Option<NodeId> {
        self.elements(id, name).next()
    }

    /// Walks up from `id` through its ancestors.
    ///
    /// With a `tag`, returns the nearest ancestor element named `tag`, or
    /// `None` if there is none. Without a `tag`, returns the topmost
    /// ancestor (the root of the tree `id` belongs to). A node without a
    /// parent has no ancestors and yields `None` either way.
    #[must_use]
    pub fn ancestor(&self, id: NodeId, tag: Option<&str>) -> Option<NodeId> {
        let mut ancestors = self.ancestors(id).skip(1);
        match tag {
            Some(tag) => ancestors.find(|&anc| self.is_named(anc, tag)),
            None => ancestors.last(),
        }
    }

    /// Returns an iterator over a node and its ancestors (walking up to the root).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Returns an iterator over all descendants of a node in document
    /// order (depth-first, pre-order). The node itself is not included.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Returns the total number of nodes in the arena, including nodes
    /// that are no longer attached to any tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1 // subtract placeholder at index 0
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over the element children of a node, optionally filtered by name.
pub struct Elements<'a> {
    children: Children<'a>,
    name: Option<&'a str>,
}

impl Iterator for Elements<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.children.doc;
        let name = self.name;
        self.children.find(|&child| match name {
            Some(name) => doc.is_named(child, name),
            None => doc.is_element(child),
        })
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Depth-first iterator over all descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        // Try to go deeper first
        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        // Try next sibling
        if let Some(sibling) = self.doc.next_sibling(current) {
            self.next = Some(sibling);
            return Some(current);
        }

        // Walk up to find an ancestor with a next sibling
        let mut ancestor = self.doc.parent(current);
        while let Some(anc) = ancestor {
            if anc == self.root {
                self.next = None;
                return Some(current);
            }
            if let Some(sibling) = self.doc.next_sibling(anc) {
                self.next = Some(sibling);
                return Some(current);
            }
            ancestor = self.doc.parent(anc);
        }

        self.next = None;
        Some(current)
    }
}
