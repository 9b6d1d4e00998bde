//! Store configuration via `strata.toml`
//!
//! Same model as the database config: a small TOML file with serde defaults
//! for every key, parsed once when the store is built.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strata_core::{StrataError, StrataResult};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Default prefix for generated local ids.
pub const DEFAULT_LID_PREFIX: &str = "@lid:";

/// Store configuration loaded from `strata.toml`.
///
/// # Example
///
/// ```toml
/// # Abort adapter fetches that take longer than this (milliseconds).
/// # fetch_timeout_ms = 5000
///
/// lid_prefix = "@lid:"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Adapter fetch timeout in milliseconds. `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
    /// Prefix for store-generated local ids.
    #[serde(default = "default_lid_prefix")]
    pub lid_prefix: String,
}

fn default_lid_prefix() -> String {
    DEFAULT_LID_PREFIX.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: None,
            lid_prefix: default_lid_prefix(),
        }
    }
}

impl StoreConfig {
    /// Fetch timeout as a `Duration`, if configured.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Check values that serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns `Config` for a zero timeout or an empty lid prefix.
    pub fn validate(&self) -> StrataResult<()> {
        if self.fetch_timeout_ms == Some(0) {
            return Err(StrataError::config(
                "fetch_timeout_ms must be greater than zero; omit it to disable the timeout",
            ));
        }
        if self.lid_prefix.is_empty() {
            return Err(StrataError::config("lid_prefix must not be empty"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata record store configuration
#
# Abort adapter fetches that take longer than this many milliseconds.
# A timed-out load leaves the record unloaded; a timed-out reload keeps
# the previously loaded data.
# fetch_timeout_ms = 5000

# Prefix for local ids the store generates for new identity slots.
lid_prefix = "@lid:"
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text cannot be parsed or fails validation.
    pub fn from_toml_str(content: &str) -> StrataResult<Self> {
        let config: StoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> StrataResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StrataError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            StrataError::config(format!(
                "Failed to load config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StrataResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StrataError::internal(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StrataError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
