//! Configuration types for findunexp.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::MATCH_ALL;
use crate::types::ReportFormat;

/// Top-level configuration for findunexp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Package discovery and filtering.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Discovery and filtering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Regex matched against import paths (default: match everything).
    #[serde(default = "default_pattern")]
    pub import_pattern: String,

    /// GOPATH-style roots, each holding a `src/` tree. Empty means `$GOPATH`.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// GOROOT, scanned before the roots when set.
    #[serde(default)]
    pub goroot: Option<PathBuf>,

    /// Target operating system for build constraints.
    #[serde(default)]
    pub goos: Option<String>,

    /// Target architecture for build constraints.
    #[serde(default)]
    pub goarch: Option<String>,

    /// Whether files importing `"C"` are considered.
    #[serde(default)]
    pub cgo: Option<bool>,

    /// Extra build tags that are satisfied.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Glob patterns over import paths to leave out of discovery.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            import_pattern: default_pattern(),
            roots: Vec::new(),
            goroot: None,
            goos: None,
            goarch: None,
            cgo: None,
            tags: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format.
    #[serde(default)]
    pub format: ReportFormat,
}

fn default_pattern() -> String {
    MATCH_ALL.to_string()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
