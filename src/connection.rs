use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::device::{DeviceHandle, DeviceOpener};
use crate::status::{ConnectionState, HealthMonitor};

/// Longest uninterrupted sleep while waiting to retry an open.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Termination flag shared by the supervisor, the reader and the host.
///
/// Set only for an operator-initiated stop, never for a device fault.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests termination. Returns `true` on the first call.
    pub fn stop(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Acquires device handles, retrying at a fixed interval for as long as the device is absent.
pub struct ConnectionManager {
    opener: Box<dyn DeviceOpener>,
    retry_interval: Duration,
    stop: StopSignal,
    health: Arc<HealthMonitor>,
}

impl ConnectionManager {
    pub fn new(
        opener: Box<dyn DeviceOpener>,
        retry_interval: Duration,
        stop: StopSignal,
        health: Arc<HealthMonitor>,
    ) -> Self {
        ConnectionManager {
            opener,
            retry_interval,
            stop,
            health,
        }
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Opens the device, retrying forever until it succeeds or [`disconnect`](Self::disconnect)
    /// is called. Returns `None` only in the latter case.
    ///
    /// Each call yields a brand new handle; the caller owns it and closes it by dropping it.
    #[tracing::instrument(skip(self), fields(device = %self.opener.describe()))]
    pub fn connect(&mut self) -> Option<Box<dyn DeviceHandle>> {
        debug!("Opening HID device.");
        self.health.transition(ConnectionState::Connecting);

        loop {
            if self.stop.is_stopped() {
                self.health.transition(ConnectionState::Disconnected);
                return None;
            }

            match self.opener.open() {
                Ok(handle) => {
                    self.health.transition(ConnectionState::Connected);
                    self.health.set_ok();
                    info!("Connected to {}.", self.opener.describe());
                    return Some(handle);
                }
                Err(e) => {
                    self.health.set_warning();
                    error!("{}; trying again in {:?}.", e, self.retry_interval);
                    self.wait_for_retry();
                }
            }
        }
    }

    /// Requests termination of the current session and of any pending connect.
    ///
    /// Safe to call repeatedly and from any thread holding the [`StopSignal`]. The reader owning
    /// the handle closes it as soon as its current read returns.
    pub fn disconnect(&self) {
        if self.stop.stop() {
            debug!("Closing HID device.");
        }
    }

    fn wait_for_retry(&self) {
        let deadline = Instant::now() + self.retry_interval;
        loop {
            if self.stop.is_stopped() {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            sleep(remaining.min(STOP_CHECK_INTERVAL));
        }
    }
}
