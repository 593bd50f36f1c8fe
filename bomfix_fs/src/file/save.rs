//! Whole-file saving, atomic by default, with permission preservation.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::SaveError;

/// Configuration for file saving operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSaveConfig {
    /// Whether to preserve file permissions (Unix only)
    pub preserve_permissions: bool,
    /// Whether to write a sibling temp file and rename it over the target
    pub atomic_writes: bool,
    /// Whether to fsync before the file is considered written
    pub sync: bool,
}

impl Default for FileSaveConfig {
    fn default() -> Self {
        FileSaveConfig {
            preserve_permissions: true,
            atomic_writes: true,
            sync: true,
        }
    }
}

/// Result of a file saving operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSaveResult {
    /// Final path where file was saved
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes_written: u64,
    /// Whether atomic write was used
    pub atomic_write: bool,
}

/// Replace the content of `path` with `content`.
pub fn save_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<FileSaveResult, SaveError> {
    save_file_with_config(path, content, &FileSaveConfig::default())
}

/// Replace the content of `path` with `content` using `config`.
pub fn save_file_with_config<P: AsRef<Path>>(
    path: P,
    content: &[u8],
    config: &FileSaveConfig,
) -> Result<FileSaveResult, SaveError> {
    let path = resolve_symlink(path.as_ref())?;
    if config.atomic_writes {
        save_atomic(&path, content, config)
    } else {
        save_direct(&path, content, config)
    }
}

/// Follow a symlink to the file it names, so the rename replaces the file and not the link.
fn resolve_symlink(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => fs::canonicalize(path),
        _ => Ok(path.to_path_buf()),
    }
}

/// Write to a temp file in the target's directory, then rename it into place.
fn save_atomic(
    path: &Path,
    content: &[u8],
    config: &FileSaveConfig,
) -> Result<FileSaveResult, SaveError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.flush()?;
    if config.sync {
        temp.as_file().sync_all()?;
    }

    if config.preserve_permissions {
        preserve_permissions(path, temp.path())?;
    }

    // A failed persist drops the temp file and leaves the target untouched.
    temp.persist(path).map_err(|e| SaveError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(FileSaveResult {
        path: path.to_path_buf(),
        bytes_written: content.len() as u64,
        atomic_write: true,
    })
}

/// Truncate and rewrite the target in place.
fn save_direct(
    path: &Path,
    content: &[u8],
    config: &FileSaveConfig,
) -> Result<FileSaveResult, SaveError> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.flush()?;
    if config.sync {
        file.sync_all()?;
    }

    tracing::debug!(path = %path.display(), "non-atomic write used");

    Ok(FileSaveResult {
        path: path.to_path_buf(),
        bytes_written: content.len() as u64,
        atomic_write: false,
    })
}

/// Copy permissions from `source` to `target`; a missing source is not an error.
#[cfg(unix)]
fn preserve_permissions(source: &Path, target: &Path) -> io::Result<()> {
    match fs::metadata(source) {
        Ok(metadata) => fs::set_permissions(target, metadata.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn preserve_permissions(source: &Path, target: &Path) -> io::Result<()> {
    match fs::metadata(source) {
        Ok(metadata) => {
            let mut permissions = fs::metadata(target)?.permissions();
            permissions.set_readonly(metadata.permissions().readonly());
            fs::set_permissions(target, permissions)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
