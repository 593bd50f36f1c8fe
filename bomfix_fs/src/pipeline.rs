//! The full per-file pipeline: read, detect, decide, rewrite.

use std::path::Path;

use crate::encoding::{CharsetGuesser, DetectionConfig, guess_raw, verdict_for};
use crate::error::NormalizeResult;
use crate::file::{FileLoadConfig, FileSaveConfig, load_file_with_config};
use crate::normalize::{ConversionDecision, normalize};
use crate::sink::StatusSink;

/// Settings for one normalization pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeConfig {
    pub detection: DetectionConfig,
    pub load: FileLoadConfig,
    pub save: FileSaveConfig,
}

/// Normalize the file at `path` to UTF-8 with BOM.
///
/// Status lines go to `sink`. Every failure also produces a line naming the
/// stage that failed before the error is returned.
pub fn normalize_file<P: AsRef<Path>>(
    path: P,
    config: &NormalizeConfig,
    guesser: &dyn CharsetGuesser,
    sink: &mut dyn StatusSink,
) -> NormalizeResult<ConversionDecision> {
    let path = path.as_ref();
    let result = run(path, config, guesser, sink);
    if let Err(err) = &result {
        sink.status(&format!(
            "{} failed for {}: {}",
            err.stage(),
            path.display(),
            err
        ));
        tracing::warn!(path = %path.display(), stage = err.stage(), error = %err, "normalization failed");
    }
    result
}

fn run(
    path: &Path,
    config: &NormalizeConfig,
    guesser: &dyn CharsetGuesser,
    sink: &mut dyn StatusSink,
) -> NormalizeResult<ConversionDecision> {
    let bytes = load_file_with_config(path, &config.load)?;

    let raw = guess_raw(&bytes, guesser)?;
    match &raw {
        Some(guess) => sink.status(&format!("Raw guess {guess}")),
        None => sink.status("Raw guess none"),
    }

    let verdict = verdict_for(&bytes, raw.as_ref(), &config.detection);
    sink.status(&format!("Detected {} for {}", verdict, path.display()));

    let decision = normalize(path, &bytes, &verdict, &config.save)?;
    match decision {
        ConversionDecision::Skip => sink.status("Already UTF-8 with BOM, skipped"),
        ConversionDecision::Convert => sink.status(&format!(
            "Converted {} to UTF-8 with BOM",
            verdict.encoding
        )),
    }

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{ChardetGuesser, FixedGuess, RawGuess};
    use crate::error::DetectError;
    use std::fs;

    struct FailingGuesser;

    impl CharsetGuesser for FailingGuesser {
        fn guess(&self, _bytes: &[u8]) -> Result<Option<RawGuess>, DetectError> {
            Err(DetectError::DetectionFailed("sampler unavailable".to_string()))
        }
    }

    #[test]
    fn test_status_lines_for_convert_then_skip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello\n").unwrap();

        let mut lines: Vec<String> = Vec::new();
        let config = NormalizeConfig::default();
        let guesser = ChardetGuesser::new();

        let first = normalize_file(&path, &config, &guesser, &mut lines).unwrap();
        assert_eq!(first, ConversionDecision::Convert);
        assert_eq!(
            lines,
            vec![
                "Raw guess ASCII 1.00".to_string(),
                format!("Detected ASCII (confidence 1.00, BOM no) for {}", path.display()),
                "Converted ASCII to UTF-8 with BOM".to_string(),
            ]
        );

        lines.clear();
        let second = normalize_file(&path, &config, &guesser, &mut lines).unwrap();
        assert_eq!(second, ConversionDecision::Skip);
        assert_eq!(lines.last().unwrap(), "Already UTF-8 with BOM, skipped");
        assert_eq!(fs::read(&path).unwrap(), b"\xEF\xBB\xBFhello\n");
    }

    #[test]
    fn test_failure_line_names_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, b"caf\xE9").unwrap();

        let mut lines: Vec<String> = Vec::new();
        let guesser = FixedGuess(Some(RawGuess::new("Shift_JIS", 0.3)));
        let err = normalize_file(&path, &NormalizeConfig::default(), &guesser, &mut lines)
            .unwrap_err();

        assert_eq!(err.stage(), "decode");
        assert!(lines.last().unwrap().starts_with("decode failed for "));
        assert_eq!(fs::read(&path).unwrap(), b"caf\xE9");
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut lines: Vec<String> = Vec::new();
        let err = normalize_file(
            dir.path().join("nope.txt"),
            &NormalizeConfig::default(),
            &ChardetGuesser::new(),
            &mut lines,
        )
        .unwrap_err();

        assert_eq!(err.stage(), "read");
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_raw_guess_reported_before_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lait.txt");
        fs::write(&path, b"caf\xE9 au lait").unwrap();

        let mut lines: Vec<String> = Vec::new();
        let guesser = FixedGuess(Some(RawGuess::new("Shift_JIS", 0.6)));
        let _ = normalize_file(&path, &NormalizeConfig::default(), &guesser, &mut lines);

        assert_eq!(lines[0], "Raw guess Shift_JIS 0.60");
        assert!(lines[1].starts_with("Detected gb18030 (confidence 0.60, BOM no)"));
    }

    #[test]
    fn test_empty_file_reports_no_guess() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        let mut lines: Vec<String> = Vec::new();
        normalize_file(&path, &NormalizeConfig::default(), &ChardetGuesser::new(), &mut lines)
            .unwrap();
        assert_eq!(lines[0], "Raw guess none");
    }

    #[test]
    fn test_detection_failure_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello\n").unwrap();

        let mut lines: Vec<String> = Vec::new();
        let err = normalize_file(&path, &NormalizeConfig::default(), &FailingGuesser, &mut lines)
            .unwrap_err();

        assert_eq!(err.stage(), "detect");
        assert_eq!(
            lines.last().unwrap(),
            &format!(
                "detect failed for {}: charset detection failed: sampler unavailable",
                path.display()
            )
        );
        assert_eq!(fs::read(&path).unwrap(), b"hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_normalized_through_link() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.txt");
        let link = dir.path().join("link.txt");
        fs::write(&real, b"hello\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut lines: Vec<String> = Vec::new();
        let decision =
            normalize_file(&link, &NormalizeConfig::default(), &ChardetGuesser::new(), &mut lines)
                .unwrap();

        assert_eq!(decision, ConversionDecision::Convert);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"\xEF\xBB\xBFhello\n");
    }
}
