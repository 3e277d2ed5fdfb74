//! Streaming event API over the markup tokenizer.
//!
//! Tokenizing is delegated to `quick-xml`. This module turns its output
//! into a small set of callbacks (start tag, end tag, character data) on a
//! [`SaxHandler`], which is how [`TreeBuilder`](crate::parser::TreeBuilder)
//! receives its input. Callers that only need to scan a document can
//! implement the trait themselves and never build a tree.
//!
//! The driver guarantees that attributes arrive in document order, that
//! entity and character references are already resolved, and that CDATA
//! sections arrive as ordinary character data. Internal entities declared
//! in the DOCTYPE are expanded as text. Declarations, comments, and
//! processing instructions are skipped.
//!
//! # Examples
//!
//! ```
//! use xmlarbor::sax::{parse_sax, SaxHandler};
//! use xmlarbor::parser::ParseOptions;
//! use xmlarbor::TreeError;
//!
//! struct Counter {
//!     elements: usize,
//! }
//!
//! impl SaxHandler for Counter {
//!     fn start_element(
//!         &mut self,
//!         _name: &str,
//!         _attributes: &[(String, String)],
//!     ) -> Result<(), TreeError> {
//!         self.elements += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut counter = Counter { elements: 0 };
//! parse_sax("<root><a/><b/><c/></root>", &ParseOptions::default(), &mut counter).unwrap();
//! assert_eq!(counter.elements, 4);
//! ```

use log::{debug, trace};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{SourceLocation, TreeError};
use crate::parser::ParseOptions;

mod entities;

use entities::EntityTable;

/// Receiver of parse events.
///
/// Every callback has a no-op default, so implementors override only what
/// they need. Returning an error from a callback stops the parse and the
/// error is handed back to the caller of [`parse_sax`].
#[allow(unused_variables)]
pub trait SaxHandler {
    /// Called once before any other event.
    ///
    /// # Errors
    ///
    /// An error aborts the parse.
    fn start_document(&mut self) -> Result<(), TreeError> {
        Ok(())
    }

    /// Called once after the last event, when the input is exhausted.
    ///
    /// # Errors
    ///
    /// An error aborts the parse.
    fn end_document(&mut self) -> Result<(), TreeError> {
        Ok(())
    }

    /// Called for each start tag. `attributes` holds `(name, value)` pairs
    /// in document order with values unescaped.
    ///
    /// # Errors
    ///
    /// An error aborts the parse.
    fn start_element(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<(), TreeError> {
        Ok(())
    }

    /// Called for each end tag, and right after `start_element` for a
    /// self-closing tag.
    ///
    /// # Errors
    ///
    /// An error aborts the parse.
    fn end_element(&mut self, name: &str) -> Result<(), TreeError> {
        Ok(())
    }

    /// Called for each chunk of character data. One run of text may arrive
    /// as several chunks (e.g. split around an entity reference).
    ///
    /// # Errors
    ///
    /// An error aborts the parse.
    fn characters(&mut self, content: &str) -> Result<(), TreeError> {
        Ok(())
    }
}

/// A handler that ignores every event. Useful for checking well-formedness.
pub struct DefaultHandler;

impl SaxHandler for DefaultHandler {}

/// Tokenizes `input` and fires the corresponding events on `handler`.
///
/// # Errors
///
/// Returns a [`MalformedDocument`](crate::ErrorKind::MalformedDocument)
/// error when the tokenizer rejects the input or nesting exceeds
/// `options.max_depth`, and passes through any error a callback returns.
/// Errors carry the source location where they were detected.
pub fn parse_sax(
    input: &str,
    options: &ParseOptions,
    handler: &mut dyn SaxHandler,
) -> Result<(), TreeError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    debug!("tokenizing {} bytes", input.len());
    handler.start_document()?;

    let mut driver = Driver::new(options);
    loop {
        let event = reader.read_event().map_err(|e| {
            TreeError::malformed_at(
                e.to_string(),
                SourceLocation::from_offset(input, offset(reader.error_position())),
            )
        })?;
        if matches!(event, Event::Eof) {
            break;
        }
        driver.dispatch(&event, handler).map_err(|e| {
            e.or_located(SourceLocation::from_offset(
                input,
                offset(reader.buffer_position()),
            ))
        })?;
    }

    handler
        .end_document()
        .map_err(|e| e.or_located(SourceLocation::from_offset(input, input.len())))?;
    debug!("tokenized {} bytes", input.len());
    Ok(())
}

/// Per-document state carried between tokenizer events.
struct Driver {
    depth: u32,
    max_depth: u32,
    entities: EntityTable,
}

impl Driver {
    fn new(options: &ParseOptions) -> Self {
        Self {
            depth: 0,
            max_depth: options.max_depth,
            entities: EntityTable::default(),
        }
    }

    /// Forwards one tokenizer event to the handler, tracking nesting depth.
    fn dispatch(
        &mut self,
        event: &Event<'_>,
        handler: &mut dyn SaxHandler,
    ) -> Result<(), TreeError> {
        match event {
            Event::Start(start) | Event::Empty(start) => {
                let is_empty = matches!(event, Event::Empty(_));
                if self.depth >= self.max_depth {
                    return Err(TreeError::malformed(format!(
                        "maximum nesting depth {} exceeded",
                        self.max_depth
                    )));
                }
                let (name, attributes) = self.read_start(start)?;
                handler.start_element(&name, &attributes)?;
                if is_empty {
                    handler.end_element(&name)
                } else {
                    self.depth += 1;
                    Ok(())
                }
            }
            Event::End(end) => {
                self.depth = self.depth.saturating_sub(1);
                handler.end_element(utf8(end.name().as_ref())?)
            }
            Event::Text(text) => {
                let content = text
                    .decode()
                    .map_err(|e| TreeError::malformed(e.to_string()))?;
                handler.characters(&content)
            }
            Event::CData(cdata) => handler.characters(utf8(cdata)?),
            Event::GeneralRef(reference) => {
                let name = reference
                    .decode()
                    .map_err(|e| TreeError::malformed(e.to_string()))?;
                handler.characters(&self.entities.resolve(&name)?)
            }
            Event::DocType(doctype) => self.entities.declare(utf8(doctype)?),
            other => {
                trace!("skipping {other:?}");
                Ok(())
            }
        }
    }

    /// Extracts the tag name and ordered, unescaped attributes of a start tag.
    fn read_start(
        &self,
        start: &BytesStart<'_>,
    ) -> Result<(String, Vec<(String, String)>), TreeError> {
        let name = utf8(start.name().as_ref())?.to_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| TreeError::malformed(e.to_string()))?;
            let key = utf8(attr.key.as_ref())?.to_owned();
            let value = self.entities.unescape(utf8(&attr.value)?)?;
            attributes.push((key, value));
        }
        Ok((name, attributes))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, TreeError> {
    std::str::from_utf8(bytes).map_err(|e| TreeError::malformed(format!("invalid UTF-8: {e}")))
}

fn offset(position: u64) -> usize {
    usize::try_from(position).unwrap_or(usize::MAX)
}
