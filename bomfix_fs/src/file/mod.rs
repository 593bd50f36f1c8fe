//! File operations for reading and rewriting whole files.
//!
//! This module provides:
//! - Whole-file loading with a size guard
//! - Atomic saving with permission preservation
//! - File identity snapshots for save detection

pub mod identity;
pub mod load;
pub mod save;

pub use identity::{FileIdentity, FileIdentityConfig};
pub use load::{FileLoadConfig, load_file, load_file_with_config};
pub use save::{FileSaveConfig, FileSaveResult, save_file, save_file_with_config};
