//! Charset detection: a statistical guess gated by a confidence policy.

use std::fmt;

use encoding_rs::Encoding;

use crate::bom::has_utf8_bom;
use crate::error::DetectError;

pub mod chardet;
pub mod transcode;

pub use chardet::ChardetGuesser;
pub use transcode::{decode_strict, resolve_encoding, transcode_to_utf8_bom};

/// Encoding used when the statistical guess is not trusted.
pub const DEFAULT_FALLBACK_ENCODING: &str = "gb18030";

/// Unfiltered output of a statistical pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGuess {
    pub name: String,
    pub confidence: f32,
}

impl fmt::Display for RawGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.name, self.confidence)
    }
}

impl RawGuess {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        RawGuess {
            name: name.into(),
            confidence,
        }
    }

    /// A guess reported with full confidence.
    pub fn certain(name: impl Into<String>) -> Self {
        Self::new(name, 1.0)
    }

    /// Whether this guess is accepted over the fallback.
    ///
    /// Any UTF family name is trusted outright; everything else needs full confidence.
    pub fn is_trusted(&self) -> bool {
        self.confidence >= 1.0 || self.name.to_ascii_lowercase().starts_with("utf")
    }
}

/// Statistical charset guesser.
///
/// Returns `Ok(None)` when no encoding clears the guesser's internal minimum.
pub trait CharsetGuesser {
    fn guess(&self, bytes: &[u8]) -> Result<Option<RawGuess>, DetectError>;
}

/// Guesser that always reports the same answer.
///
/// Useful when the caller already knows the source encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedGuess(pub Option<RawGuess>);

impl CharsetGuesser for FixedGuess {
    fn guess(&self, _bytes: &[u8]) -> Result<Option<RawGuess>, DetectError> {
        Ok(self.0.clone())
    }
}

/// Configuration for charset detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Encoding label used when the raw guess is untrusted or absent
    pub fallback_encoding: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
        }
    }
}

/// Detector verdict for one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingVerdict {
    /// Candidate encoding label, after the confidence policy
    pub encoding: String,
    /// Raw confidence in [0, 1], 0 when there was no guess
    pub confidence: f32,
    /// Whether the buffer starts with `EF BB BF`
    pub has_bom: bool,
}

impl EncodingVerdict {
    /// The candidate label resolved to a known encoding, if any.
    pub fn resolved(&self) -> Option<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
    }

    /// True for a UTF-8 candidate on a buffer that already carries the UTF-8 BOM.
    pub fn is_utf8_with_bom(&self) -> bool {
        self.has_bom && self.resolved() == Some(encoding_rs::UTF_8)
    }
}

impl fmt::Display for EncodingVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (confidence {:.2}, BOM {})",
            self.encoding,
            self.confidence,
            if self.has_bom { "yes" } else { "no" }
        )
    }
}

/// Pick the candidate encoding label from a raw guess.
pub fn select_candidate(raw: Option<&RawGuess>, fallback: &str) -> String {
    match raw {
        Some(guess) if guess.is_trusted() => guess.name.clone(),
        _ => fallback.to_string(),
    }
}

/// Run the guesser over `bytes` without applying any policy.
///
/// Empty input never reaches the guesser.
pub fn guess_raw(
    bytes: &[u8],
    guesser: &dyn CharsetGuesser,
) -> Result<Option<RawGuess>, DetectError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    guesser.guess(bytes)
}

/// Apply the confidence policy to a raw guess for `bytes`.
pub fn verdict_for(bytes: &[u8], raw: Option<&RawGuess>, config: &DetectionConfig) -> EncodingVerdict {
    let confidence = raw
        .map(|guess| {
            if guess.confidence.is_nan() {
                0.0
            } else {
                guess.confidence.clamp(0.0, 1.0)
            }
        })
        .unwrap_or(0.0);

    let verdict = EncodingVerdict {
        encoding: select_candidate(raw, &config.fallback_encoding),
        confidence,
        has_bom: has_utf8_bom(bytes),
    };

    tracing::debug!(
        raw = ?raw,
        encoding = %verdict.encoding,
        confidence = verdict.confidence,
        has_bom = verdict.has_bom,
        "charset detected"
    );

    verdict
}

/// Run the guesser over `bytes` and apply the confidence policy.
///
/// Empty input never reaches the guesser and yields the fallback with confidence 0.
pub fn detect(
    bytes: &[u8],
    guesser: &dyn CharsetGuesser,
    config: &DetectionConfig,
) -> Result<EncodingVerdict, DetectError> {
    let raw = guess_raw(bytes, guesser)?;
    Ok(verdict_for(bytes, raw.as_ref(), config))
}
