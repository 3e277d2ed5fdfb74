//! Serialization of nodes back to markup text.
//!
//! A node renders as its tag, attributes (in first-set order), and children.
//! Output is escaped by default; the raw mode emits text and attribute
//! values exactly as stored, which is only well-formed when the content
//! contains no markup characters.
//!
//! Writing the text somewhere (a file, a socket) and choosing a byte
//! encoding for it is left to the caller.

pub mod escape;
pub mod xml;

pub use escape::{escape, unescape};
pub use xml::{
    serialize_content, serialize_content_with_options, serialize_document, serialize_node,
    serialize_node_with_options, write_content, write_node, SerializeOptions,
};
