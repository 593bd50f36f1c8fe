//! File identity snapshots used to notice that a file has been saved.
//!
//! An identity combines inode, size, modification time and a hash of the
//! leading bytes, so a save is seen even when the filesystem's mtime
//! granularity hides it or the editor replaces the file by rename.

use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::Hasher;
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

/// File identity configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentityConfig {
    /// Whether to hash a sample of the content
    pub hash_content: bool,
    /// Number of leading bytes to hash
    pub hash_sample_size: usize,
}

impl Default for FileIdentityConfig {
    fn default() -> Self {
        FileIdentityConfig {
            hash_content: true,
            hash_sample_size: 8192,
        }
    }
}

/// Snapshot of a file's on-disk state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    /// Device ID (Unix), 0 elsewhere
    pub device_id: u64,
    /// Inode number (Unix), 0 elsewhere
    pub inode: u64,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub mtime: SystemTime,
    /// Hash of the first `hash_sample_size` bytes
    pub content_hash: Option<u64>,
}

impl FileIdentity {
    /// Take a snapshot of the file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &FileIdentityConfig) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let mtime = metadata.modified()?;

        let content_hash = if config.hash_content {
            Some(hash_sample(path, config.hash_sample_size)?)
        } else {
            None
        };

        #[cfg(unix)]
        let (device_id, inode) = {
            use std::os::unix::fs::MetadataExt;
            (metadata.dev(), metadata.ino())
        };

        #[cfg(not(unix))]
        let (device_id, inode) = (0, 0);

        Ok(FileIdentity {
            device_id,
            inode,
            size: metadata.len(),
            mtime,
            content_hash,
        })
    }

    /// Check if the file has been modified or replaced since this snapshot.
    pub fn is_modified(&self, current: &FileIdentity) -> bool {
        self != current
    }
}

fn hash_sample(path: &Path, sample_size: usize) -> io::Result<u64> {
    let mut sample = Vec::with_capacity(sample_size);
    File::open(path)?
        .take(sample_size as u64)
        .read_to_end(&mut sample)?;

    let mut hasher = DefaultHasher::new();
    hasher.write(&sample);
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_identity_is_stable() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"Hello, world!").unwrap();

        let config = FileIdentityConfig::default();
        let a = FileIdentity::from_path(file.path(), &config).unwrap();
        let b = FileIdentity::from_path(file.path(), &config).unwrap();

        assert_eq!(a.size, 13);
        assert!(a.content_hash.is_some());
        assert!(!a.is_modified(&b));
    }

    #[test]
    fn test_content_change_detected() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"Hello, world!").unwrap();

        let config = FileIdentityConfig::default();
        let before = FileIdentity::from_path(file.path(), &config).unwrap();

        // Same length, so only the hash (or mtime) can tell them apart.
        std::fs::write(file.path(), b"Hello, World!").unwrap();
        let after = FileIdentity::from_path(file.path(), &config).unwrap();

        assert_ne!(before.content_hash, after.content_hash);
        assert!(before.is_modified(&after));
    }

    #[test]
    fn test_without_hash() {
        let file = NamedTempFile::new().unwrap();
        let config = FileIdentityConfig {
            hash_content: false,
            hash_sample_size: 0,
        };
        let identity = FileIdentity::from_path(file.path(), &config).unwrap();
        assert_eq!(identity.content_hash, None);
        assert_eq!(identity.size, 0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileIdentity::from_path(dir.path().join("gone.txt"), &FileIdentityConfig::default());
        assert!(result.is_err());
    }
}
