//! Entity and character reference resolution.
//!
//! The five predefined entities and numeric character references are always
//! available. General entities declared with a literal value in the internal
//! DTD subset (`<!DOCTYPE r [<!ENTITY e "value">]>`) are added as the
//! DOCTYPE is read. Their replacement text is expanded once, at declaration,
//! and is delivered as character data: markup inside an entity value is not
//! parsed. Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are
//! ignored.

use std::borrow::Cow;
use std::collections::HashMap;

use log::trace;
use quick_xml::escape::resolve_xml_entity;

use crate::error::TreeError;

/// Upper bound on the combined size of all expanded entity values.
const MAX_EXPANDED_BYTES: usize = 64 * 1024;

const ENTITY_DECL: &str = "<!ENTITY";

/// General entities known to the current document.
#[derive(Debug, Default)]
pub(super) struct EntityTable {
    entities: HashMap<String, String>,
    expanded_bytes: usize,
}

impl EntityTable {
    /// Records the internal entity declarations found in DOCTYPE content.
    ///
    /// The first declaration of a name wins, and the predefined entities
    /// cannot be redefined.
    pub(super) fn declare(&mut self, doctype: &str) -> Result<(), TreeError> {
        let mut rest = doctype;
        while let Some(pos) = rest.find(ENTITY_DECL) {
            rest = rest[pos + ENTITY_DECL.len()..].trim_start();
            if let Some(after) = rest.strip_prefix('%') {
                rest = after;
                continue;
            }

            let name_end = rest
                .find(|c: char| c.is_whitespace())
                .unwrap_or(rest.len());
            let (name, tail) = rest.split_at(name_end);
            rest = tail.trim_start();

            let Some(quote) = rest.chars().next().filter(|&c| c == '"' || c == '\'') else {
                trace!("skipping external entity {name}");
                continue;
            };
            let body = &rest[1..];
            let end = body.find(quote).ok_or_else(|| {
                TreeError::malformed(format!("unterminated value for entity {name}"))
            })?;
            let value = &body[..end];
            rest = &body[end + 1..];

            if name.is_empty()
                || resolve_xml_entity(name).is_some()
                || self.entities.contains_key(name)
            {
                continue;
            }
            let expanded = self.unescape(value)?;
            self.expanded_bytes += expanded.len();
            if self.expanded_bytes > MAX_EXPANDED_BYTES {
                return Err(TreeError::malformed(format!(
                    "entity expansion exceeds {MAX_EXPANDED_BYTES} bytes"
                )));
            }
            trace!("declared entity {name}");
            self.entities.insert(name.to_owned(), expanded);
        }
        Ok(())
    }

    /// Returns the replacement text for the reference `&name;`.
    pub(super) fn resolve(&self, name: &str) -> Result<Cow<'_, str>, TreeError> {
        if let Some(number) = name.strip_prefix('#') {
            return char_reference(number).map(|c| Cow::Owned(c.to_string()));
        }
        if let Some(predefined) = resolve_xml_entity(name) {
            return Ok(Cow::Borrowed(predefined));
        }
        self.entities
            .get(name)
            .map(|value| Cow::Borrowed(value.as_str()))
            .ok_or_else(|| TreeError::malformed(format!("undefined entity &{name};")))
    }

    /// Replaces every reference in `raw` with its replacement text.
    pub(super) fn unescape(&self, raw: &str) -> Result<String, TreeError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = after.find(';').ok_or_else(|| {
                TreeError::malformed(format!("unterminated reference in {raw:?}"))
            })?;
            out.push_str(&self.resolve(&after[..semi])?);
            rest = &after[semi + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Decodes the digits of `&#...;` or `&#x...;` into a character that XML
/// allows in a document.
fn char_reference(number: &str) -> Result<char, TreeError> {
    let invalid = || TreeError::malformed(format!("invalid character reference &#{number};"));
    let code = match number.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse::<u32>(),
    }
    .map_err(|_| invalid())?;
    char::from_u32(code).filter(|&c| is_xml_char(c)).ok_or_else(invalid)
}

/// The `Char` production of XML 1.0.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}
