//! Conversion decision and rewrite of a single file.

use std::fmt;
use std::path::Path;

use crate::encoding::{EncodingVerdict, resolve_encoding, transcode_to_utf8_bom};
use crate::error::{DecodeError, NormalizeResult};
use crate::file::{FileSaveConfig, save_file_with_config};

/// What the normalizer does with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionDecision {
    /// Already UTF-8 with BOM, nothing written
    Skip,
    /// Re-encoded and written back as UTF-8 with BOM
    Convert,
}

impl fmt::Display for ConversionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDecision::Skip => write!(f, "skip"),
            ConversionDecision::Convert => write!(f, "convert"),
        }
    }
}

/// Decide from the verdict alone.
pub fn decide(verdict: &EncodingVerdict) -> ConversionDecision {
    if verdict.is_utf8_with_bom() {
        ConversionDecision::Skip
    } else {
        ConversionDecision::Convert
    }
}

/// Produce the UTF-8-with-BOM bytes for `bytes` under the verdict's candidate encoding.
pub fn convert(bytes: &[u8], verdict: &EncodingVerdict) -> Result<Vec<u8>, DecodeError> {
    let encoding = resolve_encoding(&verdict.encoding)?;
    transcode_to_utf8_bom(bytes, encoding)
}

/// Apply the decision for `bytes` (the current content of `path`).
///
/// On `Convert` the file is rewritten only once the new content is fully built;
/// on any error the file is left as it was.
pub fn normalize<P: AsRef<Path>>(
    path: P,
    bytes: &[u8],
    verdict: &EncodingVerdict,
    save_config: &FileSaveConfig,
) -> NormalizeResult<ConversionDecision> {
    let decision = decide(verdict);
    if decision == ConversionDecision::Skip {
        return Ok(decision);
    }

    let converted = convert(bytes, verdict)?;
    let saved = save_file_with_config(path, &converted, save_config)?;
    tracing::debug!(
        path = %saved.path.display(),
        bytes = saved.bytes_written,
        atomic = saved.atomic_write,
        "rewrote file"
    );

    Ok(decision)
}
