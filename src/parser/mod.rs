//! Building document trees from markup.
//!
//! Parsing is split in two: the [`sax`](crate::sax) driver tokenizes the
//! input and reports start tags, end tags, and character data, and the
//! [`TreeBuilder`] turns that event stream into a [`Document`]. The entry
//! points here wire the two together for strings, byte buffers, and files.

mod builder;

pub use builder::TreeBuilder;

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{ErrorKind, TreeError};
use crate::sax::parse_sax;
use crate::tree::Document;

/// Default maximum element nesting depth.
pub const DEFAULT_MAX_DEPTH: u32 = 256;

/// Parse options controlling tree construction.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use xmlarbor::parser::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .no_blanks(true)
///     .max_depth(64);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// If true, whitespace-only text between tags is not kept as text nodes.
    pub no_blanks: bool,
    /// Maximum element nesting depth (default: 256).
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            no_blanks: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Enables or disables stripping of blank text nodes.
    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }
}

/// Parses a markup string with default options.
///
/// # Errors
///
/// Returns a [`MalformedDocument`](crate::ErrorKind::MalformedDocument)
/// error if the input is not a single well-formed element tree.
pub fn parse_str(input: &str) -> Result<Document, TreeError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses a markup string with the given options.
///
/// A leading byte order mark is ignored.
///
/// # Errors
///
/// Returns a [`MalformedDocument`](crate::ErrorKind::MalformedDocument)
/// error if the input is not a single well-formed element tree or nests
/// deeper than `options.max_depth`.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, TreeError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut builder = TreeBuilder::with_options(options);
    parse_sax(input, options, &mut builder)?;
    let doc = builder.finish()?;
    debug!("built tree with {} nodes", doc.node_count());
    Ok(doc)
}

/// Parses markup bytes, detecting the character encoding first.
///
/// # Errors
///
/// Returns an [`Encoding`](crate::ErrorKind::Encoding) error if the bytes
/// cannot be decoded, otherwise as for [`parse_str_with_options`].
pub fn parse_bytes_with_options(
    input: &[u8],
    options: &ParseOptions,
) -> Result<Document, TreeError> {
    let text = crate::encoding::decode_to_utf8(input)?;
    parse_str_with_options(&text, options)
}

/// Reads and parses the file at `path`.
///
/// # Errors
///
/// Returns an [`Io`](crate::ErrorKind::Io) error if the file cannot be
/// read, otherwise as for [`parse_bytes_with_options`].
pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Document, TreeError> {
    let path = path.as_ref();
    debug!("reading {}", path.display());
    let bytes = fs::read(path)
        .map_err(|e| TreeError::new(ErrorKind::Io, format!("{}: {e}", path.display())))?;
    parse_bytes_with_options(&bytes, options)
}
