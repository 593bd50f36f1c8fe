use std::path::Path;
use std::time::Duration;

use bomfix_fs::{
    DEFAULT_FALLBACK_ENCODING, DetectionConfig, FileIdentityConfig, FileLoadConfig,
    FileSaveConfig, NormalizeConfig, WatcherConfig, resolve_encoding,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// `[normalize]` section: how files are detected and rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeSettings {
    /// Encoding used when the detector's guess is not trusted
    pub fallback_encoding: String,
    /// Largest file, in bytes, that will be normalized
    pub max_file_size: u64,
    /// Write through a temp file and rename
    pub atomic_writes: bool,
    /// Keep the original file mode on rewrite
    pub preserve_permissions: bool,
    /// fsync rewritten files
    pub sync: bool,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        let load = FileLoadConfig::default();
        let save = FileSaveConfig::default();
        Self {
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
            max_file_size: load.max_file_size,
            atomic_writes: save.atomic_writes,
            preserve_permissions: save.preserve_permissions,
            sync: save.sync,
        }
    }
}

impl NormalizeSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        resolve_encoding(&self.fallback_encoding).map_err(|_| {
            ConfigError::Validation(format!(
                "normalize.fallback_encoding `{}` is not a known encoding",
                self.fallback_encoding
            ))
        })?;
        if self.max_file_size == 0 {
            return Err(ConfigError::Validation(
                "normalize.max_file_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            detection: DetectionConfig {
                fallback_encoding: self.fallback_encoding.clone(),
            },
            load: FileLoadConfig {
                max_file_size: self.max_file_size,
            },
            save: FileSaveConfig {
                preserve_permissions: self.preserve_permissions,
                atomic_writes: self.atomic_writes,
                sync: self.sync,
            },
        }
    }
}

/// `[watch]` section: save detection in watch mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSettings {
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            debounce_ms: 100,
        }
    }
}

impl WatchSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            debounce_delay: Duration::from_millis(self.debounce_ms),
            identity: FileIdentityConfig::default(),
        }
    }
}

/// `[documents]` section: which files count as text documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentSettings {
    /// File extensions, without the dot, matched case-insensitively
    pub extensions: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        let extensions = [
            "c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx", "inl", "cs", "vb", "fs", "rs",
            "go", "java", "kt", "py", "lua", "js", "ts", "html", "htm", "css", "xml", "xaml",
            "json", "yaml", "yml", "toml", "ini", "cfg", "md", "txt", "sql", "sh", "bat", "cmd",
            "ps1",
        ];
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl DocumentSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::Validation(
                "documents.extensions must not contain empty entries".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `path` has one of the configured text extensions.
    pub fn is_text_document(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
