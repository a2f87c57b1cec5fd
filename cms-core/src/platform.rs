//! Platform detection and OS-specific directories.

use std::path::PathBuf;
use crate::error::{CmsError, CmsResult};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Detect the current platform at compile time.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Get the platform-specific data directory (used for log files).
    ///
    /// - Windows: `%APPDATA%/microcms`
    /// - macOS: `~/Library/Application Support/microcms`
    /// - Linux: `~/.local/share/microcms`
    pub fn data_dir() -> CmsResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| CmsError::Config("could not determine data directory".into()))?;
        Ok(base.join(crate::constants::APP_NAME))
    }

    /// Get the platform-specific configuration directory.
    ///
    /// - Windows: `%APPDATA%/microcms`
    /// - macOS: `~/Library/Application Support/microcms`
    /// - Linux: `~/.config/microcms`
    pub fn config_dir() -> CmsResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| CmsError::Config("could not determine config directory".into()))?;
        Ok(base.join(crate::constants::APP_NAME))
    }

    /// Human-readable platform name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }
}
