//! Markup serializer.
//!
//! Renders a node and its subtree as text. Elements without children use
//! the self-closing form (`<br/>`); everything else is emitted exactly as
//! stored, with no indentation added.

use std::fmt::{self, Write};

use super::escape::write_escaped;
use crate::tree::{Document, NodeId, NodeKind};

/// Options controlling serialization output.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
/// use xmlarbor::serial::{serialize_node_with_options, SerializeOptions};
///
/// let doc = Document::parse_str("<p>a &amp; b</p>").unwrap();
/// let root = doc.root_element().unwrap();
/// let raw = serialize_node_with_options(&doc, root, &SerializeOptions::default().escape(false));
/// assert_eq!(raw, "<p>a & b</p>");
/// ```
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Whether text and attribute values are escaped. Defaults to `true`.
    pub escape: bool,
    /// Whether to emit `<?xml version="1.0"?>` and a newline before the
    /// node. Defaults to `false`.
    pub declaration: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            escape: true,
            declaration: false,
        }
    }
}

impl SerializeOptions {
    /// Enables or disables escaping of `&`, `<`, `>`, and `"`.
    #[must_use]
    pub fn escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    /// Enables or disables the leading XML declaration.
    #[must_use]
    pub fn declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

/// Serializes a node, including its own tag, with escaping.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
/// use xmlarbor::serial::serialize_node;
///
/// let doc = Document::parse_str(r#"<a x="1"><b>hi</b><c/></a>"#).unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(serialize_node(&doc, root), r#"<a x="1"><b>hi</b><c/></a>"#);
/// ```
#[must_use]
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    serialize_node_with_options(doc, id, &SerializeOptions::default())
}

/// Serializes a node, including its own tag, with the given options.
#[must_use]
pub fn serialize_node_with_options(
    doc: &Document,
    id: NodeId,
    options: &SerializeOptions,
) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_node(&mut output, doc, id, options);
    output
}

/// Serializes only the children of a node, with escaping. For a text node
/// this is its own content.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
/// use xmlarbor::serial::serialize_content;
///
/// let doc = Document::parse_str("<a>one<b>two</b></a>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(serialize_content(&doc, root), "one<b>two</b>");
/// ```
#[must_use]
pub fn serialize_content(doc: &Document, id: NodeId) -> String {
    serialize_content_with_options(doc, id, &SerializeOptions::default())
}

/// Serializes only the children of a node with the given options.
#[must_use]
pub fn serialize_content_with_options(
    doc: &Document,
    id: NodeId,
    options: &SerializeOptions,
) -> String {
    let mut output = String::new();
    let _ = write_content(&mut output, doc, id, options);
    output
}

/// Serializes the document's root element with the given options.
///
/// Returns an empty string when the document has no root element.
#[must_use]
pub fn serialize_document(doc: &Document, options: &SerializeOptions) -> String {
    doc.root_element()
        .map(|root| serialize_node_with_options(doc, root, options))
        .unwrap_or_default()
}

/// Writes a node, including its own tag, into any [`fmt::Write`] sink.
///
/// # Errors
///
/// Propagates errors reported by the sink.
pub fn write_node<W: Write>(
    out: &mut W,
    doc: &Document,
    id: NodeId,
    options: &SerializeOptions,
) -> fmt::Result {
    write_declaration(out, options)?;
    write_subtree(out, doc, id, options.escape)
}

/// Writes only the children of a node into any [`fmt::Write`] sink.
///
/// # Errors
///
/// Propagates errors reported by the sink.
pub fn write_content<W: Write>(
    out: &mut W,
    doc: &Document,
    id: NodeId,
    options: &SerializeOptions,
) -> fmt::Result {
    write_declaration(out, options)?;
    match &doc.node(id).kind {
        NodeKind::Text { content } => write_text(out, content, options.escape),
        NodeKind::Element { .. } => write_children(out, doc, id, options.escape),
    }
}

fn write_declaration<W: Write>(out: &mut W, options: &SerializeOptions) -> fmt::Result {
    if options.declaration {
        out.write_str("<?xml version=\"1.0\"?>\n")?;
    }
    Ok(())
}

fn write_subtree<W: Write>(out: &mut W, doc: &Document, id: NodeId, escape: bool) -> fmt::Result {
    match &doc.node(id).kind {
        NodeKind::Text { content } => write_text(out, content, escape),
        NodeKind::Element { name, attributes } => {
            out.write_char('<')?;
            out.write_str(name)?;
            for attr in attributes {
                out.write_char(' ')?;
                out.write_str(&attr.name)?;
                out.write_str("=\"")?;
                write_text(out, &attr.value, escape)?;
                out.write_char('"')?;
            }

            if doc.first_child(id).is_none() {
                return out.write_str("/>");
            }
            out.write_char('>')?;
            write_children(out, doc, id, escape)?;
            out.write_str("</")?;
            out.write_str(name)?;
            out.write_char('>')
        }
    }
}

fn write_children<W: Write>(out: &mut W, doc: &Document, id: NodeId, escape: bool) -> fmt::Result {
    for child in doc.children(id) {
        write_subtree(out, doc, child, escape)?;
    }
    Ok(())
}

fn write_text<W: Write>(out: &mut W, text: &str, escape: bool) -> fmt::Result {
    if escape {
        write_escaped(out, text)
    } else {
        out.write_str(text)
    }
}
