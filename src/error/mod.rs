//! Error types for tree construction and tree operations.
//!
//! Every fallible operation in the crate returns a [`TreeError`]. The
//! [`ErrorKind`] separates API misuse (attribute access on a text node, an
//! empty element name) from malformed input reported while building a tree.
//!
//! Lookups that simply find nothing (a missing attribute, no matching child,
//! an empty search) are not errors; they return `None` or a default value.

use std::fmt;

/// The category of a [`TreeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An operation was applied to a node that cannot support it, e.g.
    /// setting an attribute on a text node or creating an element with an
    /// empty name.
    InvalidOperation,
    /// The event stream does not describe a well-formed document: unbalanced
    /// tags, character data outside the root element, several roots, or a
    /// tokenizer error.
    MalformedDocument,
    /// Reading the input failed.
    Io,
    /// The input bytes could not be decoded to UTF-8.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperation => write!(f, "invalid operation"),
            Self::MalformedDocument => write!(f, "malformed document"),
            Self::Io => write!(f, "i/o error"),
            Self::Encoding => write!(f, "encoding error"),
        }
    }
}

/// Source location within the markup input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `input`.
    ///
    /// Offsets past the end of `input` are clamped to its length.
    #[must_use]
    pub fn from_offset(input: &str, byte_offset: usize) -> Self {
        let mut end = byte_offset.min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        let before = &input[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
            byte_offset: end,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error type returned by fallible tree and parse operations.
#[derive(Debug, Clone)]
pub struct TreeError {
    /// What went wrong, broadly.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Where in the input the error was detected, when it came from parsing.
    pub location: Option<SourceLocation>,
}

impl TreeError {
    /// Creates an error of the given kind with no source location.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Creates an [`ErrorKind::InvalidOperation`] error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }

    /// Creates an [`ErrorKind::MalformedDocument`] error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedDocument, message)
    }

    /// Creates an [`ErrorKind::MalformedDocument`] error at a known location.
    #[must_use]
    pub fn malformed_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            location: Some(location),
            ..Self::malformed(message)
        }
    }

    /// Attaches a location unless one is already recorded.
    #[must_use]
    pub fn or_located(mut self, location: SourceLocation) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{} at {}: {}", self.kind, loc, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<std::io::Error> for TreeError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}
