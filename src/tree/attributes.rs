//! Attribute access on element nodes.
//!
//! Attributes are stored as an ordered `Vec<Attribute>` with unique names,
//! so a single list carries both the first-set order and the name → value
//! mapping. Setting an existing name overwrites its value in place.
//!
//! Reads never fail: an attribute that is not defined reads as the caller's
//! default (or the empty string / zero). Writes fail on text nodes.

use super::{Attribute, Document, NodeId, NodeKind};
use crate::error::TreeError;

impl Document {
    /// Returns the attributes of an element node, in first-set order.
    ///
    /// Returns an empty slice for text nodes.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes,
            NodeKind::Text { .. } => &[],
        }
    }

    /// Returns the attribute names of an element, in first-set order.
    #[must_use]
    pub fn attribute_names(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attributes(id).iter().map(|a| a.name.as_str())
    }

    /// Returns the value of an attribute, or `None` if it is not defined.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Returns `true` if the attribute is defined on the node.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Returns the value of an attribute, or `default` if it is not defined.
    ///
    /// Pass `""` for the plain "absent reads as empty" behaviour.
    #[must_use]
    pub fn attribute_or<'a>(&'a self, id: NodeId, name: &str, default: &'a str) -> &'a str {
        self.attribute(id, name).unwrap_or(default)
    }

    /// Reads an attribute as a number.
    ///
    /// Only the leading numeric part of the value is converted (see
    /// [`numeric_prefix`]); trailing text is ignored. Returns `default` when
    /// the attribute is absent or does not start with a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let doc = Document::parse_str(r#"<box w="12.5cm" h="auto"/>"#).unwrap();
    /// let root = doc.root_element().unwrap();
    /// assert_eq!(doc.attribute_numeric(root, "w", 5.0), 12.5);
    /// assert_eq!(doc.attribute_numeric(root, "h", 5.0), 5.0);
    /// assert_eq!(doc.attribute_numeric(root, "d", 5.0), 5.0);
    /// ```
    #[must_use]
    pub fn attribute_numeric(&self, id: NodeId, name: &str, default: f64) -> f64 {
        self.attribute(id, name)
            .and_then(numeric_prefix)
            .unwrap_or(default)
    }

    /// Looks an attribute up on the node, then on each ancestor in turn,
    /// returning the first definition found or `default` once the root has
    /// been passed.
    #[must_use]
    pub fn attribute_in_context<'a>(&'a self, id: NodeId, name: &str, default: &'a str) -> &'a str {
        self.defining_node(id, name)
            .and_then(|owner| self.attribute(owner, name))
            .unwrap_or(default)
    }

    /// Numeric form of [`attribute_in_context`](Self::attribute_in_context).
    ///
    /// The nearest definition decides: if it does not start with a number
    /// the result is `default`, even when a farther ancestor holds a number.
    #[must_use]
    pub fn attribute_numeric_in_context(&self, id: NodeId, name: &str, default: f64) -> f64 {
        self.defining_node(id, name)
            .map_or(default, |owner| self.attribute_numeric(owner, name, default))
    }

    /// The nearest node, starting at `id` and walking up, that defines `name`.
    fn defining_node(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(id).find(|&anc| self.has_attribute(anc, name))
    }

    /// Sets an attribute, appending the name if it is new and overwriting
    /// the value in place otherwise.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// error if `id` is a text node.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        let NodeKind::Element { attributes, .. } = &mut self.node_mut(id).kind else {
            return Err(TreeError::invalid_operation(
                "attributes require an element node",
            ));
        };
        match attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => value.clone_into(&mut existing.value),
            None => attributes.push(Attribute::new(name, value)),
        }
        Ok(())
    }

    /// Sets the attribute when `value` is given, then returns its current
    /// value (empty if it is still undefined).
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// error if `id` is a text node.
    pub fn set_or_get_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<&str, TreeError> {
        match value {
            Some(value) => self.set_attribute(id, name, value)?,
            None if !self.is_element(id) => {
                return Err(TreeError::invalid_operation(
                    "attributes require an element node",
                ));
            }
            None => {}
        }
        Ok(self.attribute_or(id, name, ""))
    }
}

/// Converts the leading number of `value`.
///
/// The prefix is an optional sign followed by a run of digits and dots.
/// Within that run the digits up to the second dot are converted; a run
/// made only of dots converts to zero. Returns `None` when `value` does not
/// start with such a prefix.
///
/// # Examples
///
/// ```
/// use xmlarbor::tree::numeric_prefix;
///
/// assert_eq!(numeric_prefix("12.5abc"), Some(12.5));
/// assert_eq!(numeric_prefix("-3px"), Some(-3.0));
/// assert_eq!(numeric_prefix("1.2.3"), Some(1.2));
/// assert_eq!(numeric_prefix("abc"), None);
/// ```
#[must_use]
pub fn numeric_prefix(value: &str) -> Option<f64> {
    let bytes = value.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let run_len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .count();
    if run_len == 0 {
        return None;
    }

    let run = &value[start..start + run_len];
    let number = match run.find('.') {
        Some(dot) => {
            let fraction = &run[dot + 1..];
            let fraction_len = fraction.find('.').unwrap_or(fraction.len());
            &run[..dot + 1 + fraction_len]
        }
        None => run,
    };

    let magnitude = if number.bytes().any(|b| b.is_ascii_digit()) {
        number.parse::<f64>().ok()?
    } else {
        0.0
    };
    Some(if negative { -magnitude } else { magnitude })
}
