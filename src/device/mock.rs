//! Scripted in-memory device for tests and dry runs.
//!
//! A [`MockOpener`] holds a queue of open outcomes. Each successful open hands out a
//! [`MockDevice`] that replays its script and then idles (`Ok(None)`) until dropped.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{DeviceHandle, DeviceOpener};
use crate::error::DeviceError;

/// Pause of an idle mock read, standing in for a device poll timeout.
const IDLE_READ: Duration = Duration::from_millis(1);

/// One step of a device script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockStep {
    Byte(u8),
    /// The read fails as if the device had been unplugged.
    Unplug,
}

/// Result of one open attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOpen {
    Missing,
    Device(Vec<MockStep>),
}

#[derive(Debug, Default)]
struct Shared {
    outcomes: Mutex<VecDeque<MockOpen>>,
    attempts: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Opener whose results are scripted up front. Clones share the same script and counters.
///
/// Once the script is exhausted every open fails as if the device were missing.
#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    shared: Arc<Shared>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `count` failed opens.
    pub fn missing(self, count: usize) -> Self {
        self.push((0..count).map(|_| MockOpen::Missing));
        self
    }

    /// Queues a successful open that delivers `bytes` and then idles.
    pub fn session(self, bytes: &[u8]) -> Self {
        let steps = bytes.iter().map(|&b| MockStep::Byte(b)).collect();
        self.push([MockOpen::Device(steps)]);
        self
    }

    /// Queues a successful open that delivers `bytes` and then fails.
    pub fn session_then_unplug(self, bytes: &[u8]) -> Self {
        let mut steps: Vec<MockStep> = bytes.iter().map(|&b| MockStep::Byte(b)).collect();
        steps.push(MockStep::Unplug);
        self.push([MockOpen::Device(steps)]);
        self
    }

    fn push(&self, outcomes: impl IntoIterator<Item = MockOpen>) {
        let mut queue = self
            .shared
            .outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        queue.extend(outcomes);
    }

    /// Open attempts so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    /// Handles handed out so far.
    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Handles dropped so far.
    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl DeviceOpener for MockOpener {
    fn open(&mut self) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        self.shared.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self
            .shared
            .outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(MockOpen::Device(steps)) => {
                self.shared.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(MockDevice {
                    steps: steps.into(),
                    shared: Arc::clone(&self.shared),
                }))
            }
            Some(MockOpen::Missing) | None => Err(DeviceError::Open {
                path: "mock".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Handle produced by [`MockOpener`].
#[derive(Debug)]
pub struct MockDevice {
    steps: VecDeque<MockStep>,
    shared: Arc<Shared>,
}

impl DeviceHandle for MockDevice {
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
        match self.steps.pop_front() {
            Some(MockStep::Byte(b)) => Ok(Some(b)),
            Some(MockStep::Unplug) => Err(DeviceError::Read(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock device unplugged",
            ))),
            None => {
                thread::sleep(IDLE_READ);
                Ok(None)
            }
        }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
    }
}
