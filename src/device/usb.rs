use std::collections::VecDeque;
use std::ffi::CString;
use std::fmt::{Debug, Error, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

use super::{DeviceHandle, DeviceOpener};
use crate::error::DeviceError;

/// Largest input report a full-speed HID interrupt endpoint can deliver.
const REPORT_SIZE: usize = 64;

/// A hidraw device opened through hidapi. Reads wait at most `timeout_ms`.
pub struct HidrawDevice {
    device: HidDevice,
    pending: VecDeque<u8>,
    timeout_ms: i32,
}

impl Debug for HidrawDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "HidrawDevice {{ pending: {}, timeout_ms: {} }}",
            self.pending.len(),
            self.timeout_ms
        )
    }
}

impl DeviceHandle for HidrawDevice {
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Some(byte));
        }

        let mut report = [0u8; REPORT_SIZE];
        let len = self
            .device
            .read_timeout(&mut report, self.timeout_ms)
            .map_err(|e| DeviceError::Read(io::Error::other(e)))?;
        self.pending.extend(report.iter().take(len));
        Ok(self.pending.pop_front())
    }
}

/// Opens a hidraw node by path, initializing hidapi on first use.
pub struct HidrawOpener {
    hidapi: Option<HidApi>,
    path: PathBuf,
    timeout_ms: i32,
}

impl HidrawOpener {
    pub fn new(path: &Path, poll_interval: Duration) -> Self {
        HidrawOpener {
            hidapi: None,
            path: path.to_path_buf(),
            timeout_ms: i32::try_from(poll_interval.as_millis()).unwrap_or(i32::MAX),
        }
    }

    fn open_error(&self, source: io::Error) -> DeviceError {
        DeviceError::Open {
            path: self.path.clone(),
            source,
        }
    }
}

impl DeviceOpener for HidrawOpener {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn open(&mut self) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        let path = CString::new(self.path.to_string_lossy().into_owned())
            .map_err(|e| self.open_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let hidapi = match self.hidapi.take() {
            Some(hidapi) => hidapi,
            None => {
                debug!("Initializing the hidapi.");
                HidApi::new().map_err(|e| self.open_error(io::Error::other(e)))?
            }
        };
        let opened = hidapi.open_path(&path);
        self.hidapi = Some(hidapi);

        let device = opened.map_err(|e| self.open_error(io::Error::other(e)))?;
        let product = device
            .get_product_string()
            .ok()
            .flatten()
            .unwrap_or_else(|| "NA".to_string());
        info!("Opened {} ({}).", self.path.display(), product);

        Ok(Box::new(HidrawDevice {
            device,
            pending: VecDeque::with_capacity(REPORT_SIZE),
            timeout_ms: self.timeout_ms,
        }))
    }

    fn describe(&self) -> String {
        format!("{} (hidapi)", self.path.display())
    }
}
