//! Whole-file loading with a size guard.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LoadError;

/// Configuration for file loading operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLoadConfig {
    /// Largest file, in bytes, that will be buffered (default: 64MB)
    pub max_file_size: u64,
}

impl Default for FileLoadConfig {
    fn default() -> Self {
        FileLoadConfig {
            max_file_size: 64 * 1024 * 1024,
        }
    }
}

/// Read the whole file at `path` into memory.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoadError> {
    load_file_with_config(path, &FileLoadConfig::default())
}

/// Read the whole file at `path`, refusing files larger than `config.max_file_size`.
pub fn load_file_with_config<P: AsRef<Path>>(
    path: P,
    config: &FileLoadConfig,
) -> Result<Vec<u8>, LoadError> {
    let file = File::open(path.as_ref())?;
    let size = file.metadata()?.len();
    if size > config.max_file_size {
        return Err(LoadError::FileTooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    let mut bytes = Vec::with_capacity(size as usize);
    // The file may grow between stat and read; never buffer past the limit.
    file.take(config.max_file_size + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > config.max_file_size {
        return Err(LoadError::FileTooLarge {
            size: bytes.len() as u64,
            limit: config.max_file_size,
        });
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_bytes_verbatim() {
        let file = NamedTempFile::new().unwrap();
        let content = b"\xEF\xBB\xBFline1\r\nline2\xE9";
        std::fs::write(file.path(), content).unwrap();

        let bytes = load_file(file.path()).unwrap();
        assert_eq!(bytes, content);
    }

    #[test]
    fn test_load_empty() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_size_limit() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"0123456789").unwrap();

        let config = FileLoadConfig { max_file_size: 4 };
        let err = load_file_with_config(file.path(), &config).unwrap_err();
        assert!(matches!(err, LoadError::FileTooLarge { size: 10, limit: 4 }));

        let config = FileLoadConfig { max_file_size: 10 };
        assert_eq!(load_file_with_config(file.path(), &config).unwrap().len(), 10);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
