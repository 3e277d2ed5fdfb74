//! Depth-first element search.
//!
//! A [`SearchQuery`] matches elements by tag name, by the value of one
//! attribute, or both. Searches cover every element below the starting
//! node (not the node itself) in document order: each element is tested
//! before its descendants, and a match does not stop the descent.

use crate::tree::{Document, NodeId};

/// Criteria for [`search`] and [`search_first`].
///
/// An empty query matches every element. An attribute criterion compares
/// with [`Document::attribute_or`] semantics, so an absent attribute reads
/// as the empty string: `.attribute("class", "")` matches elements that
/// lack `class` as well as those where it is empty.
///
/// # Examples
///
/// ```
/// use xmlarbor::{Document, SearchQuery};
///
/// let doc = Document::parse_str(r#"<r><p k="x"/><q><p k="y"/><p k="x"/></q></r>"#).unwrap();
/// let root = doc.root_element().unwrap();
/// let query = SearchQuery::new().element("p").attribute("k", "x");
/// assert_eq!(doc.search(root, &query).len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Required tag name, if any.
    pub element: Option<String>,
    /// Required `(name, value)` attribute pair, if any.
    pub attribute: Option<(String, String)>,
}

impl SearchQuery {
    /// Creates a query that matches every element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matches to elements named `name`.
    #[must_use]
    pub fn element(mut self, name: &str) -> Self {
        self.element = Some(name.to_string());
        self
    }

    /// Restricts matches to elements whose attribute `name` equals `value`.
    #[must_use]
    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attribute = Some((name.to_string(), value.to_string()));
        self
    }

    /// Returns `true` if `id` satisfies every criterion of the query.
    #[must_use]
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        if !doc.is_element(id) {
            return false;
        }
        let name_ok = self
            .element
            .as_deref()
            .map_or(true, |name| doc.is_named(id, name));
        let attr_ok = self
            .attribute
            .as_ref()
            .map_or(true, |(name, value)| doc.attribute_or(id, name, "") == value.as_str());
        name_ok && attr_ok
    }
}

/// Returns every element below `id` that matches `query`, in document order.
#[must_use]
pub fn search(doc: &Document, id: NodeId, query: &SearchQuery) -> Vec<NodeId> {
    doc.descendants(id)
        .filter(|&node| query.matches(doc, node))
        .collect()
}

/// Returns the first element below `id` that matches `query`, or `None`.
///
/// Equivalent to the first entry of [`search`], without visiting the rest
/// of the tree.
#[must_use]
pub fn search_first(doc: &Document, id: NodeId, query: &SearchQuery) -> Option<NodeId> {
    doc.descendants(id).find(|&node| query.matches(doc, node))
}

impl Document {
    /// Shorthand for [`search`](crate::search::search).
    #[must_use]
    pub fn search(&self, id: NodeId, query: &SearchQuery) -> Vec<NodeId> {
        search(self, id, query)
    }

    /// Shorthand for [`search_first`](crate::search::search_first).
    #[must_use]
    pub fn search_first(&self, id: NodeId, query: &SearchQuery) -> Option<NodeId> {
        search_first(self, id, query)
    }
}
