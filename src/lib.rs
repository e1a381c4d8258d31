//! Reads raw scan codes from a USB HID barcode scanner and emits one decoded barcode per scan.
//!
//! The scanner is opened as a character device (usually `/dev/hidraw*`) and read one byte at a
//! time. Bytes are collected until the Enter scan code (`0x28`) ends the record, which is then
//! decoded through a US-layout scan-code table into a string.
//!
//! [`BarcodeScannerServer`] keeps the device open: it retries a missing device forever, reconnects
//! after read errors, and only gives up when stopped.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use hid_barcode_scanner::device::file::FileOpener;
//! use hid_barcode_scanner::status::TracingStatusReporter;
//! use hid_barcode_scanner::{BarcodeEvent, BarcodeScannerServer};
//!
//! let (tx, rx) = crossbeam::channel::unbounded::<BarcodeEvent>();
//! let mut server = BarcodeScannerServer::new(
//!     Box::new(FileOpener::new("/dev/hidraw0")),
//!     Duration::from_secs(1),
//!     Arc::new(tx),
//!     Box::new(TracingStatusReporter),
//! );
//! server.start()?;
//! for event in rx.iter() {
//!     println!("{:?}", event.barcode);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod config;
pub mod connection;
pub mod constants;
pub mod decoder;
pub mod device;
pub mod error;
pub mod events;
pub mod framing;
pub mod hid_map;
pub mod reader;
pub mod server;
pub mod status;
pub mod tools;

pub use config::{Backend, ScannerConfig};
pub use connection::{ConnectionManager, StopSignal};
pub use decoder::decode_record;
pub use error::{ConfigError, DecodeError, DeviceError};
pub use events::{BarcodeEvent, EventSink};
pub use reader::{DelimitedReader, SessionEnd};
pub use server::BarcodeScannerServer;
pub use status::{ConnectionState, HealthMonitor, Status, StatusReporter};
