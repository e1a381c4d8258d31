use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::{DeviceHandle, DeviceOpener};
use crate::constants::DEFAULT_POLL_INTERVAL;
use crate::error::DeviceError;

/// Raw, buffered reads from a character device such as `/dev/hidraw0`.
///
/// hidraw returns whole input reports per `read(2)`; the buffer hands them out one byte at a time.
/// When the buffer is empty a read waits at most `timeout_ms` for the device to become readable.
#[derive(Debug)]
pub struct FileDevice {
    reader: BufReader<File>,
    timeout_ms: i32,
}

impl FileDevice {
    pub fn open(path: &Path, poll_interval: Duration) -> Result<Self, DeviceError> {
        let file = File::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            reader: BufReader::new(file),
            timeout_ms: i32::try_from(poll_interval.as_millis()).unwrap_or(i32::MAX),
        })
    }

    /// Waits until the descriptor is readable, hung up, or the timeout elapses.
    fn wait_readable(&self) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.reader.get_ref().as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `pfd` is a valid, exclusively borrowed pollfd and nfds is 1. The descriptor
        // stays open for the call because `self.reader` owns it.
        let ready = unsafe { libc::poll(&mut pfd, 1, self.timeout_ms) };
        if ready < 0 {
            let e = io::Error::last_os_error();
            if e.kind() == ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(e);
        }
        Ok(ready > 0)
    }
}

impl DeviceHandle for FileDevice {
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
        if self.reader.buffer().is_empty() && !self.wait_readable()? {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.reader.read(&mut byte) {
            Ok(0) => Err(DeviceError::Closed),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(DeviceError::Read(e)),
        }
    }
}

impl Drop for FileDevice {
    fn drop(&mut self) {
        debug!("Closing HID device.");
    }
}

/// Opens [`FileDevice`]s for a fixed path.
#[derive(Debug, Clone)]
pub struct FileOpener {
    path: PathBuf,
    poll_interval: Duration,
}

impl FileOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl DeviceOpener for FileOpener {
    fn open(&mut self) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        Ok(Box::new(FileDevice::open(&self.path, self.poll_interval)?))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::unix::ffi::OsStrExt;
    use std::time::Instant;

    use super::*;

    fn make_fifo(dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join("hidraw-fifo");
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(io::Error::other)?;
        // SAFETY: `c_path` is a valid NUL-terminated path.
        if unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(path)
    }

    #[test]
    fn reads_bytes_then_reports_closed() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&[0x04, 0x28])?;
        file.flush()?;

        let mut opener = FileOpener::new(file.path());
        let mut handle = opener.open()?;
        assert_eq!(handle.read_byte()?, Some(0x04));
        assert_eq!(handle.read_byte()?, Some(0x28));
        assert!(matches!(handle.read_byte(), Err(DeviceError::Closed)));
        Ok(())
    }

    #[test]
    fn missing_device_is_an_open_error() {
        let mut opener = FileOpener::new("/nonexistent/hidraw-test-device");
        match opener.open() {
            Err(DeviceError::Open { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/hidraw-test-device"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening a missing device succeeded"),
        }
    }

    #[test]
    fn silent_device_times_out_instead_of_blocking() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let fifo = make_fifo(dir.path())?;
        // Read-write open of a FIFO does not wait for a peer, and keeps the reader from seeing EOF.
        let mut scanner = OpenOptions::new().read(true).write(true).open(&fifo)?;

        let mut opener = FileOpener::new(&fifo).with_poll_interval(Duration::from_millis(10));
        let mut handle = opener.open()?;

        let started = Instant::now();
        assert_eq!(handle.read_byte()?, None);
        assert!(started.elapsed() < Duration::from_secs(2));

        scanner.write_all(&[0x05, 0x28])?;
        scanner.flush()?;
        assert_eq!(handle.read_byte()?, Some(0x05));
        assert_eq!(handle.read_byte()?, Some(0x28));
        assert_eq!(handle.read_byte()?, None);
        Ok(())
    }
}
