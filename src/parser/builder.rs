//! Event-driven tree construction.
//!
//! [`TreeBuilder`] is a [`SaxHandler`] that assembles the events of one
//! document into a [`Document`]. It is a small state machine:
//!
//! - `Empty`: nothing seen yet. The first start tag creates the root.
//! - `Building`: a cursor points at the innermost open element. Start tags
//!   append a child and descend; end tags climb back to the parent.
//! - `Finished`: the root has been closed. Only whitespace may follow.
//!
//! Consecutive character-data events are collected and stored as a single
//! text node when the next tag (or the end of input) arrives, so the shape
//! of the tree does not depend on how the tokenizer chunks text.

use log::trace;

use crate::error::TreeError;
use crate::parser::ParseOptions;
use crate::sax::SaxHandler;
use crate::tree::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Empty,
    Building { cursor: NodeId },
    Finished { root: NodeId },
}

/// Builds a [`Document`] from parse events.
///
/// # Examples
///
/// ```
/// use xmlarbor::parser::{ParseOptions, TreeBuilder};
/// use xmlarbor::sax::parse_sax;
///
/// let mut builder = TreeBuilder::new();
/// parse_sax("<list><item/></list>", &ParseOptions::default(), &mut builder).unwrap();
/// let doc = builder.finish().unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.node_name(root), Some("list"));
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    doc: Document,
    state: BuilderState,
    /// Character data received since the last tag.
    pending_text: String,
    no_blanks: bool,
}

impl TreeBuilder {
    /// Creates a builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&ParseOptions::default())
    }

    /// Creates a builder honouring `options.no_blanks`.
    #[must_use]
    pub fn with_options(options: &ParseOptions) -> Self {
        Self {
            doc: Document::new(),
            state: BuilderState::Empty,
            pending_text: String::new(),
            no_blanks: options.no_blanks,
        }
    }

    /// Returns the finished document.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedDocument`](crate::ErrorKind::MalformedDocument)
    /// error unless exactly one root element was opened and closed.
    pub fn finish(self) -> Result<Document, TreeError> {
        match self.state {
            BuilderState::Finished { .. } => Ok(self.doc),
            BuilderState::Empty => Err(TreeError::malformed("no root element")),
            BuilderState::Building { cursor } => Err(self.unclosed(cursor)),
        }
    }

    fn unclosed(&self, cursor: NodeId) -> TreeError {
        TreeError::malformed(format!(
            "unclosed element <{}>",
            self.doc.node_name(cursor).unwrap_or_default()
        ))
    }

    /// Stores the collected character data under the cursor.
    fn flush_text(&mut self) -> Result<(), TreeError> {
        if self.pending_text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending_text);
        let BuilderState::Building { cursor } = self.state else {
            return Ok(());
        };
        if self.no_blanks && text.trim().is_empty() {
            trace!(
                "dropping blank text under <{}>",
                self.doc.node_name(cursor).unwrap_or_default()
            );
            return Ok(());
        }
        let node = self.doc.create_text(&text);
        self.doc.append_child(cursor, node)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SaxHandler for TreeBuilder {
    fn start_element(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<(), TreeError> {
        self.flush_text()?;
        if let BuilderState::Finished { root } = self.state {
            return Err(TreeError::malformed(format!(
                "element <{name}> after the root element <{}> was closed",
                self.doc.node_name(root).unwrap_or_default()
            )));
        }

        let element = self.doc.create_element(name)?;
        for (key, value) in attributes {
            self.doc.set_attribute(element, key, value)?;
        }
        if let BuilderState::Building { cursor } = self.state {
            self.doc.append_child(cursor, element)?;
        }
        self.state = BuilderState::Building { cursor: element };
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), TreeError> {
        self.flush_text()?;
        let BuilderState::Building { cursor } = self.state else {
            return Err(TreeError::malformed(format!(
                "end tag </{name}> without a matching start tag"
            )));
        };

        let open = self.doc.node_name(cursor).unwrap_or_default();
        if open != name {
            return Err(TreeError::malformed(format!(
                "end tag </{name}> does not match <{open}>"
            )));
        }

        self.state = match self.doc.parent(cursor) {
            Some(parent) => BuilderState::Building { cursor: parent },
            None => {
                self.doc.set_root_element(cursor)?;
                BuilderState::Finished { root: cursor }
            }
        };
        Ok(())
    }

    fn characters(&mut self, content: &str) -> Result<(), TreeError> {
        if matches!(self.state, BuilderState::Building { .. }) {
            self.pending_text.push_str(content);
            return Ok(());
        }
        if content.trim().is_empty() {
            return Ok(());
        }
        Err(TreeError::malformed(
            "character data outside the root element",
        ))
    }

    fn end_document(&mut self) -> Result<(), TreeError> {
        self.flush_text()?;
        match self.state {
            BuilderState::Finished { .. } => Ok(()),
            BuilderState::Empty => Err(TreeError::malformed("no root element")),
            BuilderState::Building { cursor } => Err(self.unclosed(cursor)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::{parse_str, parse_str_with_options};
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_first_start_becomes_root() {
        let mut builder = TreeBuilder::new();
        builder.start_element("a", &attrs(&[("x", "1")])).unwrap();
        builder.end_element("a").unwrap();
        builder.end_document().unwrap();
        let doc = builder.finish().unwrap();

        let root = doc.root_element().unwrap();
        assert_eq!(doc.node_name(root), Some("a"));
        assert_eq!(doc.parent(root), None);
        assert_eq!(doc.attribute(root, "x"), Some("1"));
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_driven_by_events() {
        let mut builder = TreeBuilder::new();
        builder.start_element("a", &[]).unwrap();
        builder.start_element("b", &[]).unwrap();
        builder.characters("hi").unwrap();
        builder.end_element("b").unwrap();
        builder.characters("tail").unwrap();
        builder.end_element("a").unwrap();
        let doc = builder.finish().unwrap();

        let root = doc.root_element().unwrap();
        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(children.len(), 2);
        assert_eq!(doc.text_content(children[0]), "hi");
        assert_eq!(doc.node_text(children[1]), Some("tail"));
    }

    #[test]
    fn test_attributes_applied_in_event_order() {
        let mut builder = TreeBuilder::new();
        builder
            .start_element("e", &attrs(&[("z", "1"), ("a", "2"), ("m", "3")]))
            .unwrap();
        builder.end_element("e").unwrap();
        let doc = builder.finish().unwrap();
        let root = doc.root_element().unwrap();
        let names: Vec<&str> = doc.attribute_names(root).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_adjacent_chunks_merge() {
        let doc = parse_str("<t>a &amp; b &#65;</t>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.children(root).count(), 1);
        assert_eq!(doc.text_content(root), "a & b A");
    }

    #[test]
    fn test_end_without_start() {
        let mut builder = TreeBuilder::new();
        let err = builder.end_element("a").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_mismatched_end() {
        let mut builder = TreeBuilder::new();
        builder.start_element("a", &[]).unwrap();
        let err = builder.end_element("b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_text_outside_root() {
        let mut builder = TreeBuilder::new();
        builder.characters("\n  ").unwrap();
        let err = builder.characters("stray").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);

        let err = parse_str("<a/>trailing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_second_root_rejected() {
        let err = parse_str("<a/><b/>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_unclosed_and_empty_input() {
        let mut builder = TreeBuilder::new();
        builder.start_element("open", &[]).unwrap();
        let err = builder.end_document().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
        assert!(err.message.contains("<open>"));

        let err = parse_str("").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
        assert!(TreeBuilder::new().finish().is_err());
    }

    #[test]
    fn test_prolog_and_epilog_whitespace_ignored() {
        let doc = parse_str("<?xml version=\"1.0\"?>\n<!-- lead -->\n<r>x</r>\n").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.text_content(root), "x");
    }

    #[test]
    fn test_no_blanks() {
        let input = "<r>\n  <a> </a>\n  <b>x y</b>\n</r>";
        let doc = parse_str(input).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.children(root).count(), 5);

        let doc = parse_str_with_options(input, &ParseOptions::default().no_blanks(true)).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.children(root).count(), 2);
        let a = doc.first_element(root, Some("a")).unwrap();
        assert_eq!(doc.children(a).count(), 0);
        let b = doc.first_element(root, Some("b")).unwrap();
        assert_eq!(doc.text_content(b), "x y");
    }

    #[test]
    fn test_error_location_reported() {
        let err = parse_str("<a>\n</b>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
        assert_eq!(err.location.map(|l| l.line), Some(2));
    }
}
