//! Optional TOML configuration file.
//!
//! Every key is optional; anything left out keeps the value it already had
//! (the built-in default, before CLI flags are applied on top).
//!
//! ```toml
//! endpoint = "ws://192.168.1.20:8080"
//! reconnect_backoff_secs = 2
//! channel_capacity = 64
//!
//! [pins]
//! clk = 17
//! dt = 18
//! button = 27
//! button_debounce_ms = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{BridgeConfig, InvalidConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The merged configuration failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] InvalidConfig),
}

// ── File schema ───────────────────────────────────────────────────────────────

/// Contents of the config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub reconnect_backoff_secs: Option<u64>,
    pub channel_capacity: Option<usize>,
    #[serde(default)]
    pub pins: FilePins,
}

/// The `[pins]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilePins {
    pub clk: Option<u8>,
    pub dt: Option<u8>,
    pub button: Option<u8>,
    pub button_debounce_ms: Option<u64>,
}

impl FileConfig {
    /// Parses TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Overlays the values present in the file onto `base`.
    pub fn apply(self, mut base: BridgeConfig) -> BridgeConfig {
        if let Some(endpoint) = self.endpoint {
            base.endpoint = endpoint;
        }
        if let Some(secs) = self.reconnect_backoff_secs {
            base.reconnect_backoff = Duration::from_secs(secs);
        }
        if let Some(capacity) = self.channel_capacity {
            base.channel_capacity = capacity;
        }
        if let Some(clk) = self.pins.clk {
            base.pins.clk = clk;
        }
        if let Some(dt) = self.pins.dt {
            base.pins.dt = dt;
        }
        if let Some(button) = self.pins.button {
            base.pins.button = button;
        }
        if let Some(ms) = self.pins.button_debounce_ms {
            base.pins.button_debounce = (ms > 0).then(|| Duration::from_millis(ms));
        }
        base
    }
}

/// Loads `path` over the defaults and validates the result.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let config = FileConfig::load(path)?.apply(BridgeConfig::default());
    config.validate()?;
    Ok(config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
