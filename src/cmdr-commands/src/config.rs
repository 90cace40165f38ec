//! Program configuration.
//!
//! A [`ProgramConfig`] holds the display metadata and the dispatch toggles of
//! a [`Program`](crate::Program). It can be built in code or loaded from TOML:
//!
//! ```toml
//! name = "myapp"
//! version = "1.2.0"
//! usage = "Manage widgets"
//! default_command = "serve"
//! hide_version_flag = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Display metadata and dispatch toggles for a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Application name, shown in usage and version output.
    pub name: String,

    /// Application version.
    pub version: String,

    /// One-line description printed under the version line.
    pub usage: Option<String>,

    /// Banner printed at the top of the full usage (ASCII art and the like).
    pub banner: Option<String>,

    /// Command to run when no command name is given.
    pub default_command: Option<String>,

    /// Disable the built-in `help` command.
    pub hide_help_command: bool,

    /// Disable the built-in `version` command.
    pub hide_version_command: bool,

    /// Disable the global `-h`/`--help` flag.
    pub hide_help_flag: bool,

    /// Disable the global `-v`/`--version` flag.
    pub hide_version_flag: bool,
}

impl ProgramConfig {
    /// Create a configuration with a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Default command name, with empty names treated as unset.
    pub fn default_command(&self) -> Option<&str> {
        self.default_command
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Fill empty `name` and `version` fields with the given values.
    pub fn with_fallbacks(mut self, name: &str, version: &str) -> Self {
        if self.name.is_empty() {
            self.name = name.to_string();
        }
        if self.version.is_empty() {
            self.version = version.to_string();
        }
        self
    }
}
