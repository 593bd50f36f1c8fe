use std::fs;
use std::path::Path;

use bomfix_fs::{
    ChardetGuesser, CharsetGuesser, ConversionDecision, DecodeError, DetectionConfig,
    EncodingVerdict, FixedGuess, NormalizeConfig, NormalizeError, RawGuess, UTF8_BOM, detect,
    normalize_file,
};

fn run(path: &Path, guesser: &dyn CharsetGuesser) -> Result<ConversionDecision, NormalizeError> {
    let mut lines: Vec<String> = Vec::new();
    normalize_file(path, &NormalizeConfig::default(), guesser, &mut lines)
}

fn with_bom(text: &str) -> Vec<u8> {
    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

#[test]
fn skip_leaves_file_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ok.txt");
    let content = with_bom("already normalized \u{4e2d}\u{6587}\r\n");
    fs::write(&path, &content).unwrap();

    let decision = run(&path, &ChardetGuesser::new()).unwrap();

    assert_eq!(decision, ConversionDecision::Skip);
    assert_eq!(fs::read(&path).unwrap(), content);
}

#[test]
fn legacy_cafe_is_converted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cafe.txt");
    fs::write(&path, b"caf\xE9").unwrap();

    let guesser = FixedGuess(Some(RawGuess::certain("windows-1252")));
    let decision = run(&path, &guesser).unwrap();

    assert_eq!(decision, ConversionDecision::Convert);
    assert_eq!(fs::read(&path).unwrap(), with_bom("caf\u{e9}"));
}

#[test]
fn decode_failure_keeps_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.txt");
    let content = b"valid start \xFF\xFE\xFD".to_vec();
    fs::write(&path, &content).unwrap();

    let guesser = FixedGuess(Some(RawGuess::new("UTF-8", 0.3)));
    let err = run(&path, &guesser).unwrap_err();

    assert!(matches!(
        err,
        NormalizeError::DecodeFailed(DecodeError::Malformed { encoding: "UTF-8" })
    ));
    assert_eq!(fs::read(&path).unwrap(), content);
}

#[test]
fn empty_file_becomes_bare_bom() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, b"").unwrap();

    let verdict = detect(b"", &ChardetGuesser::new(), &DetectionConfig::default()).unwrap();
    assert_eq!(
        verdict,
        EncodingVerdict {
            encoding: "gb18030".to_string(),
            confidence: 0.0,
            has_bom: false,
        }
    );

    let decision = run(&path, &ChardetGuesser::new()).unwrap();
    assert_eq!(decision, ConversionDecision::Convert);
    assert_eq!(fs::read(&path).unwrap(), UTF8_BOM);

    assert_eq!(run(&path, &ChardetGuesser::new()).unwrap(), ConversionDecision::Skip);
}

#[test]
fn bom_flag_ignores_statistical_guess() {
    let bytes = with_bom("hello");
    for raw in [
        None,
        Some(RawGuess::new("Shift_JIS", 0.6)),
        Some(RawGuess::certain("windows-1252")),
        Some(RawGuess::new("UTF-16", 0.1)),
    ] {
        let verdict = detect(&bytes, &FixedGuess(raw), &DetectionConfig::default()).unwrap();
        assert!(verdict.has_bom);
    }
}

#[test]
fn gb18030_fallback_converts_chinese_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zh.txt");
    let text = "\u{4f60}\u{597d}\u{ff0c}\u{4e16}\u{754c}";
    let (encoded, _, _) = encoding_rs::GB18030.encode(text);
    fs::write(&path, &encoded).unwrap();

    // An untrusted legacy guess falls back to gb18030.
    let guesser = FixedGuess(Some(RawGuess::new("EUC-KR", 0.7)));
    assert_eq!(run(&path, &guesser).unwrap(), ConversionDecision::Convert);
    assert_eq!(fs::read(&path).unwrap(), with_bom(text));
}

#[test]
fn utf16_file_with_bom_is_converted_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.txt");
    let mut content = vec![0xFF, 0xFE];
    for unit in "h\u{e9}".encode_utf16() {
        content.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, &content).unwrap();

    let guesser = ChardetGuesser::new();
    assert_eq!(run(&path, &guesser).unwrap(), ConversionDecision::Convert);
    assert_eq!(fs::read(&path).unwrap(), with_bom("h\u{e9}"));
    assert_eq!(run(&path, &guesser).unwrap(), ConversionDecision::Skip);
}

#[test]
fn converted_file_detects_as_utf8_with_bom() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("post.txt");
    fs::write(&path, "na\u{ef}ve r\u{e9}sum\u{e9}".as_bytes()).unwrap();

    let guesser = ChardetGuesser::new();
    run(&path, &guesser).unwrap();

    let bytes = fs::read(&path).unwrap();
    let verdict = detect(&bytes, &guesser, &DetectionConfig::default()).unwrap();
    assert_eq!(verdict.encoding, "UTF-8");
    assert!(verdict.has_bom);
}
