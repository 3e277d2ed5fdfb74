//! Escaping of the four markup-significant characters.

use std::borrow::Cow;
use std::fmt;

/// Replaces `&`, `<`, `>`, and `"` with their entity references.
///
/// The ampersand is handled first so that entities produced here are never
/// escaped a second time. Returns the input unchanged (borrowed) when there
/// is nothing to escape.
///
/// # Examples
///
/// ```
/// use xmlarbor::serial::escape;
///
/// assert_eq!(escape(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
/// assert_eq!(escape("plain"), "plain");
/// ```
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    // Writing into a String cannot fail.
    let _ = write_escaped(&mut out, text);
    Cow::Owned(out)
}

/// Reverses [`escape`]: `&lt;`, `&gt;`, `&quot;`, then `&amp;`.
///
/// `&amp;` is resolved last so that `&amp;lt;` becomes `&lt;` rather than
/// `<`. No other entity or character reference is recognised.
///
/// # Examples
///
/// ```
/// use xmlarbor::serial::unescape;
///
/// assert_eq!(unescape("a&lt;b &amp;lt;"), "a<b &lt;");
/// ```
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&"),
    )
}

/// Writes `text` to `out` with the four markup characters escaped.
pub(crate) fn write_escaped<W: fmt::Write>(out: &mut W, text: &str) -> fmt::Result {
    let mut rest = text;
    while let Some(pos) = rest.find(['&', '<', '>', '"']) {
        out.write_str(&rest[..pos])?;
        let entity = match rest.as_bytes()[pos] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => "&quot;",
        };
        out.write_str(entity)?;
        rest = &rest[pos + 1..];
    }
    out.write_str(rest)
}
