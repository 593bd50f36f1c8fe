//! # bomfix_fs - Encoding normalization engine for bomfix
//!
//! Detects the character encoding of a text file and rewrites it as UTF-8
//! with a leading byte-order mark. Running it on an already normalized file
//! changes nothing.
//!
//! Modules:
//! - `bom` for byte-order mark sniffing
//! - `encoding` for the statistical guess, the confidence policy and transcoding
//! - `normalize` for the skip/convert decision and the rewrite
//! - `pipeline` for the read, detect, rewrite sequence on one path
//! - `file` for whole-file loading, atomic saving and identity snapshots
//! - `watcher` for turning on-disk modifications into save events
//! - `sink` for status line output

mod bom;
mod encoding;
mod error;
mod file;
mod normalize;
mod pipeline;
mod sink;
mod watcher;

pub use bom::{BomDetectionResult, UTF8_BOM, detect_bom, has_utf8_bom};
pub use encoding::chardet::{ASCII_LABEL, LOW_CONFIDENCE};
pub use encoding::{
    ChardetGuesser, CharsetGuesser, DEFAULT_FALLBACK_ENCODING, DetectionConfig, EncodingVerdict,
    FixedGuess, RawGuess, decode_strict, detect, guess_raw, resolve_encoding, select_candidate,
    transcode_to_utf8_bom, verdict_for,
};
pub use error::{DecodeError, DetectError, LoadError, NormalizeError, NormalizeResult, SaveError};
pub use file::{
    FileIdentity, FileIdentityConfig, FileLoadConfig, FileSaveConfig, FileSaveResult, load_file,
    load_file_with_config, save_file, save_file_with_config,
};
pub use normalize::{ConversionDecision, convert, decide, normalize};
pub use pipeline::{NormalizeConfig, normalize_file};
pub use sink::{StatusSink, TracingSink};
pub use watcher::{SaveEvent, SaveWatcher, WatcherConfig, WatcherError, WatcherResult};
