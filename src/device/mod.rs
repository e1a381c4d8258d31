//! Device handles.
//!
//! A [`DeviceOpener`] produces a fresh [`DeviceHandle`] on every successful open. The handle is
//! owned by exactly one reader at a time and is closed when it is dropped.

use crate::config::{Backend, ScannerConfig};
use crate::error::{ConfigError, DeviceError};

pub mod file;
pub mod mock;
#[cfg(feature = "hidapi")]
pub mod usb;

/// An open byte stream from the scanner.
pub trait DeviceHandle: Send {
    /// Reads the next byte.
    ///
    /// Returns `Ok(None)` when the backend's poll interval elapsed without data, so the caller
    /// can check for shutdown before reading again.
    ///
    /// # Errors
    ///
    /// Any error means the handle is no longer usable.
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError>;
}

/// Opens handles to one configured device.
pub trait DeviceOpener: Send {
    /// # Errors
    ///
    /// Returns [`DeviceError::Open`] when the device is missing, busy or not readable.
    fn open(&mut self) -> Result<Box<dyn DeviceHandle>, DeviceError>;

    /// Human readable name of the device, for logs.
    fn describe(&self) -> String;
}

/// Builds the opener selected by `config.backend`.
///
/// # Errors
///
/// Fails when the backend was not compiled into this binary.
pub fn opener_for(config: &ScannerConfig) -> Result<Box<dyn DeviceOpener>, ConfigError> {
    match config.backend {
        Backend::File => Ok(Box::new(
            file::FileOpener::new(&config.device).with_poll_interval(config.poll_interval()),
        )),
        #[cfg(feature = "hidapi")]
        Backend::Hidapi => Ok(Box::new(usb::HidrawOpener::new(
            &config.device,
            config.poll_interval(),
        ))),
        #[cfg(not(feature = "hidapi"))]
        Backend::Hidapi => Err(ConfigError::UnsupportedBackend(Backend::Hidapi)),
    }
}
