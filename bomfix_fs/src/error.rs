//! Error types for every stage of the normalization pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The statistical pass could not process the buffer.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("charset detection failed: {0}")]
    DetectionFailed(String),
}

/// The candidate encoding could not turn the buffer into text.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The label does not name any encoding known to the decoder
    #[error("unknown encoding label `{0}`")]
    UnknownEncoding(String),
    /// The bytes are not valid under the encoding
    #[error("bytes are not valid {encoding}")]
    Malformed { encoding: &'static str },
}

/// Errors raised while reading a file into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },
}

/// Errors raised while writing a file back to disk.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The temp file was written but could not replace the target
    #[error("could not replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pipeline failure, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("read failed: {0}")]
    ReadFailed(#[from] LoadError),
    #[error(transparent)]
    DetectionFailed(#[from] DetectError),
    #[error("decode failed: {0}")]
    DecodeFailed(#[from] DecodeError),
    #[error("write failed: {0}")]
    WriteFailed(#[from] SaveError),
}

impl NormalizeError {
    /// Short name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            NormalizeError::ReadFailed(_) => "read",
            NormalizeError::DetectionFailed(_) => "detect",
            NormalizeError::DecodeFailed(_) => "decode",
            NormalizeError::WriteFailed(_) => "write",
        }
    }
}

/// Result type for the normalization pipeline
pub type NormalizeResult<T> = Result<T, NormalizeError>;
