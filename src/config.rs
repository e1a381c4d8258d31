use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEVICE_PATH, DEFAULT_POLL_INTERVAL, DEFAULT_RECONNECT_INTERVAL,
};
use crate::error::ConfigError;

/// How the device file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Plain blocking reads of the device file.
    #[default]
    File,
    /// hidapi's hidraw backend, with timed reads.
    Hidapi,
}

/// Scanner settings. Every field is optional in the TOML file.
///
/// ```toml
/// device = "/dev/hidraw1"
/// reconnect_interval_ms = 2000
/// backend = "hidapi"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub device: PathBuf,
    pub reconnect_interval_ms: u64,
    pub poll_interval_ms: u64,
    pub backend: Backend,
    pub json_logs: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            device: PathBuf::from(DEFAULT_DEVICE_PATH),
            reconnect_interval_ms: millis(DEFAULT_RECONNECT_INTERVAL),
            poll_interval_ms: millis(DEFAULT_POLL_INTERVAL),
            backend: Backend::default(),
            json_logs: false,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ScannerConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
