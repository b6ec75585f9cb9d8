//! TOML configuration for the record geometry and default access strategy.
//!
//! Enabled with the `config` cargo feature. A file looks like:
//!
//! ```toml
//! record_size = 100
//! record_count = 1000000
//! strategy = "mmap"
//! ```
//!
//! Every key is optional and falls back to the built-in default.

use crate::error::{RecfileError, Result};
use crate::record_file::{AccessStrategy, RecordGeometry, RECORD_COUNT, RECORD_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings loaded from a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecfileConfig {
    pub record_size: usize,
    pub record_count: u64,
    pub strategy: Option<String>,
}

impl Default for RecfileConfig {
    fn default() -> Self {
        Self {
            record_size: RECORD_SIZE,
            record_count: RECORD_COUNT,
            strategy: None,
        }
    }
}

impl RecfileConfig {
    /// Location of the per-user configuration file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recfile").join("config.toml"))
    }

    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RecfileError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
            .map_err(|e| RecfileError::config(format!("{}: {}", path.display(), e)))
    }

    /// Load the per-user configuration, or defaults when there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Validated geometry described by this configuration
    pub fn geometry(&self) -> Result<RecordGeometry> {
        RecordGeometry::new(self.record_size, self.record_count)
    }

    /// Configured access strategy, defaulting to positional I/O
    pub fn strategy(&self) -> Result<AccessStrategy> {
        match &self.strategy {
            Some(name) => name.parse(),
            None => Ok(AccessStrategy::Positional),
        }
    }
}
