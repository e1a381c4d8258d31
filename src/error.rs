use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Backend;

/// A record could not be turned into a barcode string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("scan code {code:#04x} at position {position} is not mapped (shifted: {shifted})")]
    UnmappedScanCode {
        code: u8,
        shifted: bool,
        position: usize,
    },
}

/// Failures of the device handle.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("unable to open HID device {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read from HID device failed: {0}")]
    Read(#[from] io::Error),

    #[error("HID device closed")]
    Closed,
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("backend {0:?} is not available in this build")]
    UnsupportedBackend(Backend),
}
