//! # xmlarbor
//!
//! An arena-backed XML document tree. Markup text is tokenized by an
//! event source, assembled into a tree of element and text nodes, and can
//! then be navigated, searched, edited, and serialized back to text.
//!
//! ## Quick Start
//!
//! ```
//! use xmlarbor::Document;
//!
//! let doc = Document::parse_str(r#"<a x="1"><b>hi</b><b>bye</b></a>"#).unwrap();
//! let root = doc.root_element().unwrap();
//! assert_eq!(doc.node_name(root), Some("a"));
//! assert_eq!(doc.attribute(root, "x"), Some("1"));
//! assert_eq!(doc.elements(root, Some("b")).count(), 2);
//! assert_eq!(xmlarbor::serial::serialize_node(&doc, root), r#"<a x="1"><b>hi</b><b>bye</b></a>"#);
//! ```

pub mod encoding;
pub mod error;
pub mod parser;
pub mod sax;
pub mod search;
pub mod serial;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use error::{ErrorKind, TreeError};
pub use search::SearchQuery;
pub use tree::{Attribute, Document, NodeId, NodeKind};
