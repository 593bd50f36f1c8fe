use crate::error::{ConfigError, ConfigResult};
use crate::settings::{DocumentSettings, NormalizeSettings, WatchSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for bomfix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Detection and rewrite settings
    pub normalize: NormalizeSettings,
    /// Watch mode settings
    pub watch: WatchSettings,
    /// Text document filter
    pub documents: DocumentSettings,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Export configuration as TOML string
    pub fn to_toml_string(&self) -> String {
        // Every field is a plain scalar or array, so serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Check every section for values the pipeline cannot use
    pub fn validate(&self) -> ConfigResult<()> {
        self.normalize.validate()?;
        self.watch.validate()?;
        self.documents.validate()?;
        Ok(())
    }

    /// Get default configuration file paths, in lookup order
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // User-specific config
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(&home).join(".bomfix").join("config.toml"));
            paths.push(PathBuf::from(&home).join(".config").join("bomfix").join("config.toml"));
        }

        // System-wide config
        paths.push(PathBuf::from("/etc/bomfix/config.toml"));

        // Current directory
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join(".bomfix.toml"));
            paths.push(current_dir.join("bomfix.toml"));
        }

        paths
    }

    /// Load configuration with automatic path discovery
    pub fn load() -> ConfigResult<Self> {
        Self::load_with_paths(&Self::config_paths())
    }

    /// Load the first existing file from `paths`, or the defaults if none exists
    pub fn load_with_paths(paths: &[PathBuf]) -> ConfigResult<Self> {
        for path in paths {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::from_file(path);
            }
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }
}
