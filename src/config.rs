//! Configuration for the companion search front end.

use companion_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CompanionError, Result};

/// Top-level configuration, stored as `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Search aggregator settings (`[search]` table).
    pub search: SearchConfig,
    /// Logging settings (`[logging]` table).
    pub logging: LoggingConfig,
    /// Output rendering settings (`[output]` table).
    pub output: OutputConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Also write a daily-rotated log file.
    pub file: bool,
    /// Directory for log files. Defaults to the platform data dir.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: false,
            log_dir: None,
        }
    }
}

/// How search results are rendered for a reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Maximum size of the rendered summary, in bytes.
    pub max_summary_bytes: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_summary_bytes: 16_384,
        }
    }
}

impl CompanionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CompanionError::Config(e.to_string()))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicitly named file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.exists() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CompanionError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path (see [`crate::companion_dirs::config_file`]).
    pub fn default_config_path() -> PathBuf {
        crate::companion_dirs::config_file()
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Search`] for invalid search settings and
    /// [`CompanionError::Config`] for the rest.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(CompanionError::Config("logging.level must not be empty".into()));
        }
        if self.output.max_summary_bytes == 0 {
            return Err(CompanionError::Config(
                "output.max_summary_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
