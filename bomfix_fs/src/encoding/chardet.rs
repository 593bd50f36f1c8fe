//! Default statistical guesser backed by `chardetng`.

use chardetng::EncodingDetector;

use super::{CharsetGuesser, RawGuess};
use crate::bom::detect_bom;
use crate::error::DetectError;

/// Confidence reported when chardetng does not consider its guess reliable.
pub const LOW_CONFIDENCE: f32 = 0.5;

/// Label reported for input made only of 7-bit bytes.
pub const ASCII_LABEL: &str = "ASCII";

/// Guesser combining BOM sniffing, UTF-8 validation and chardetng scoring.
///
/// Order of checks:
/// 1) Unicode BOM (certain)
/// 2) pure ASCII (certain)
/// 3) valid UTF-8 with non-ASCII content (certain)
/// 4) chardetng over the legacy encodings
///
/// Files carry no top-level domain hint, so chardetng scores without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetGuesser;

impl ChardetGuesser {
    pub fn new() -> Self {
        ChardetGuesser
    }
}

impl CharsetGuesser for ChardetGuesser {
    fn guess(&self, bytes: &[u8]) -> Result<Option<RawGuess>, DetectError> {
        if bytes.is_empty() {
            return Ok(None);
        }

        if let Some(encoding) = detect_bom(bytes).encoding {
            return Ok(Some(RawGuess::certain(encoding.name())));
        }

        if bytes.is_ascii() {
            return Ok(Some(RawGuess::certain(ASCII_LABEL)));
        }

        if simdutf8::basic::from_utf8(bytes).is_ok() {
            return Ok(Some(RawGuess::certain(encoding_rs::UTF_8.name())));
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let (encoding, high_confidence) = detector.guess_assess(None, false);
        let confidence = if high_confidence { 1.0 } else { LOW_CONFIDENCE };

        Ok(Some(RawGuess::new(encoding.name(), confidence)))
    }
}
