//! Node type definitions.
//!
//! A node is either an element (named, with ordered attributes and ordered
//! children) or a run of text. The variant carries the payload; navigation
//! links (parent, children, siblings) live in `NodeData`.

/// The kind of a node and its associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element node, e.g., `<item id="3">`.
    Element {
        /// The tag name. Never empty.
        name: String,
        /// Attributes in first-set order. Names are unique.
        attributes: Vec<Attribute>,
    },

    /// A text node holding character data verbatim (unescaped).
    Text {
        /// The text content.
        content: String,
    },
}

impl NodeKind {
    /// Returns `true` for the `Element` variant.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value (unescaped).
    pub value: String,
}

impl Attribute {
    /// Creates an attribute from a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
