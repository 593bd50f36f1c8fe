use encoding_rs::Encoding;

/// The UTF-8 byte-order mark
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Result of BOM detection containing the detected encoding and BOM length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BomDetectionResult {
    pub encoding: Option<&'static Encoding>,
    pub bom_length: usize,
}

/// Detect a Unicode byte-order mark (UTF-8, UTF-16LE, UTF-16BE) at the start of `bytes`.
pub fn detect_bom(bytes: &[u8]) -> BomDetectionResult {
    match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => BomDetectionResult {
            encoding: Some(encoding),
            bom_length,
        },
        None => BomDetectionResult {
            encoding: None,
            bom_length: 0,
        },
    }
}

/// True when the first three bytes are exactly `EF BB BF`.
///
/// Looks only at the raw bytes, never at any detector output.
pub fn has_utf8_bom(bytes: &[u8]) -> bool {
    bytes.starts_with(&UTF8_BOM)
}
