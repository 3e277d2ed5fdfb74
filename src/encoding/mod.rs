//! Input decoding for byte sources.
//!
//! The tree builder works on `&str`. Byte input (files, network buffers) is
//! first decoded here: a byte order mark selects UTF-8 or UTF-16, otherwise
//! UTF-8 is assumed, and an `encoding="..."` in the XML declaration can
//! override the guess. Transcoding goes through `encoding_rs`.

use crate::error::{ErrorKind, TreeError};

fn encoding_error(message: impl Into<String>) -> TreeError {
    TreeError::new(ErrorKind::Encoding, message)
}

/// Detects the encoding of a byte stream from its byte order mark.
///
/// Returns the encoding label and the number of BOM bytes to skip.
///
/// # Examples
///
/// ```
/// use xmlarbor::encoding::detect_encoding;
///
/// assert_eq!(detect_encoding(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_encoding(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Transcodes `bytes` from the named encoding into a UTF-8 `String`.
///
/// # Errors
///
/// Returns an [`Encoding`](crate::ErrorKind::Encoding) error if the label is
/// unknown or the bytes are malformed for that encoding.
pub fn transcode(bytes: &[u8], encoding_name: &str) -> Result<String, TreeError> {
    let encoding = encoding_rs::Encoding::for_label(encoding_name.as_bytes())
        .ok_or_else(|| encoding_error(format!("unsupported encoding: {encoding_name}")))?;

    let (result, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(encoding_error(format!(
            "malformed byte sequence for encoding {encoding_name}"
        )));
    }
    Ok(result.into_owned())
}

/// Decodes markup bytes to UTF-8, detecting the encoding automatically.
///
/// The BOM, if any, is removed from the result.
///
/// # Errors
///
/// Returns an [`Encoding`](crate::ErrorKind::Encoding) error if the bytes are
/// invalid for the detected encoding or the declared encoding is unknown.
///
/// # Examples
///
/// ```
/// use xmlarbor::encoding::decode_to_utf8;
///
/// let text = decode_to_utf8(b"<?xml version=\"1.0\"?><root/>").unwrap();
/// assert!(text.ends_with("<root/>"));
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, TreeError> {
    let (bom_encoding, bom_skip) = detect_encoding(bytes);
    let content = &bytes[bom_skip..];

    if bom_encoding == "UTF-8" {
        // The declaration is ASCII, so it can be read before decoding.
        if let Some(declared) = declared_encoding(content) {
            if !is_utf8_label(&declared) {
                return transcode(content, &declared);
            }
        }
        return std::str::from_utf8(content)
            .map(str::to_owned)
            .map_err(|e| encoding_error(format!("input is not valid UTF-8: {e}")));
    }

    let text = transcode(content, bom_encoding)?;
    match declared_encoding(text.as_bytes()) {
        Some(declared) if !is_compatible(&declared, bom_encoding) => transcode(content, &declared),
        _ => Ok(text),
    }
}

/// Reads the `encoding` pseudo-attribute of a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let scan = &bytes[..bytes.len().min(200)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let decl_end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..decl_end];

    let needle = b"encoding";
    let enc_pos = decl.windows(needle.len()).position(|w| w == needle)?;
    let rest = skip_ascii_whitespace(&decl[enc_pos + needle.len()..]);
    let rest = skip_ascii_whitespace(rest.strip_prefix(b"=")?);

    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &rest[1..];
    let end = value.iter().position(|&b| b == quote)?;
    let label = &value[..end];
    label
        .is_ascii()
        .then(|| String::from_utf8_lossy(label).into_owned())
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("UTF-8") || label.eq_ignore_ascii_case("UTF8")
}

/// Whether a declared label agrees with the encoding chosen from the BOM.
fn is_compatible(declared: &str, bom_encoding: &str) -> bool {
    declared.eq_ignore_ascii_case(bom_encoding)
        || (declared.eq_ignore_ascii_case("UTF-16") && bom_encoding.starts_with("UTF-16"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_detect_boms() {
        assert_eq!(detect_encoding(b"\xFE\xFF\x00<"), ("UTF-16BE", 2));
        assert_eq!(detect_encoding(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
        assert_eq!(detect_encoding(b""), ("UTF-8", 0));
    }

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode_to_utf8("<a>é</a>".as_bytes()).unwrap(), "<a>é</a>");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        assert_eq!(decode_to_utf8(b"\xEF\xBB\xBF<a/>").unwrap(), "<a/>");
    }

    #[test]
    fn test_decode_utf16le() {
        let bytes = utf16le("<?xml version=\"1.0\" encoding=\"UTF-16\"?><a>ü</a>");
        let text = decode_to_utf8(&bytes).unwrap();
        assert!(text.ends_with("<a>ü</a>"));
    }

    #[test]
    fn test_decode_declared_latin1() {
        let mut bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</a>");
        let text = decode_to_utf8(&bytes).unwrap();
        assert!(text.ends_with("<a>é</a>"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_to_utf8(b"<a>\xFF</a>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Encoding);
    }

    #[test]
    fn test_transcode_unknown_label() {
        let err = transcode(b"x", "no-such-encoding").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Encoding);
    }

    #[test]
    fn test_declared_encoding_single_quotes() {
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding = 'utf-8'?><a/>"),
            Some("utf-8".to_string())
        );
        assert_eq!(declared_encoding(b"<a/>"), None);
    }
}
