//! Pure decode-then-re-encode step, free of any file I/O.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::bom::{UTF8_BOM, detect_bom};
use crate::error::DecodeError;

/// Resolve an encoding label (WHATWG names and aliases, case-insensitive).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, DecodeError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DecodeError::UnknownEncoding(label.to_string()))
}

/// Decode `bytes` as `encoding`, refusing any malformed sequence.
///
/// A leading BOM is dropped only when it belongs to `encoding`.
pub fn decode_strict<'a>(
    bytes: &'a [u8],
    encoding: &'static Encoding,
) -> Result<Cow<'a, str>, DecodeError> {
    let bom = detect_bom(bytes);
    let body = if bom.encoding == Some(encoding) {
        &bytes[bom.bom_length..]
    } else {
        bytes
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(DecodeError::Malformed {
            encoding: encoding.name(),
        })
}

/// Decode `bytes` as `encoding` and return the text as UTF-8 prefixed with `EF BB BF`.
pub fn transcode_to_utf8_bom(
    bytes: &[u8],
    encoding: &'static Encoding,
) -> Result<Vec<u8>, DecodeError> {
    let text = decode_strict(bytes, encoding)?;

    let mut out = Vec::with_capacity(UTF8_BOM.len() + text.len());
    out.extend_from_slice(&UTF8_BOM);
    out.extend_from_slice(text.as_bytes());
    Ok(out)
}
