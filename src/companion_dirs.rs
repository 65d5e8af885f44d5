//! Centralized application directory paths for Companion.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/companion/` | `~/.local/share/companion/` |
//! | Config | `~/Library/Application Support/companion/` | `~/.config/companion/` |
//!
//! # Environment Overrides
//!
//! - `COMPANION_DATA_DIR` overrides [`data_dir`]
//! - `COMPANION_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Resolves to `dirs::data_dir()/companion/` by default. Override with
/// the `COMPANION_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("COMPANION_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("companion"))
        .unwrap_or_else(|| PathBuf::from("/tmp/companion-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/companion/` by default. Override with
/// the `COMPANION_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("COMPANION_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("companion"))
        .unwrap_or_else(|| PathBuf::from("/tmp/companion-config"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
