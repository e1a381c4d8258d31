use std::sync::Mutex;

use crossbeam::channel::Sender;
use derive_more::Display;
use tracing::{debug, info, warn};

/// Health reported to the host.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A handle is open and being read.
    #[display(fmt = "ok")]
    Ok,
    /// The device cannot be opened or a read failed.
    #[display(fmt = "warning")]
    Warning,
}

/// Where the device connection currently is.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    #[display(fmt = "disconnected")]
    Disconnected,
    #[display(fmt = "connecting")]
    Connecting,
    #[display(fmt = "connected")]
    Connected,
    #[display(fmt = "reading")]
    Reading,
    #[display(fmt = "failing")]
    Failing,
}

/// Receives status changes. Called from whichever thread detects the change.
pub trait StatusReporter: Send + Sync {
    fn set_status(&self, status: Status);
}

impl StatusReporter for Sender<Status> {
    fn set_status(&self, status: Status) {
        if self.send(status).is_err() {
            debug!("Status {} dropped, no receiver.", status);
        }
    }
}

/// Logs status changes and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusReporter;

impl StatusReporter for TracingStatusReporter {
    fn set_status(&self, status: Status) {
        match status {
            Status::Ok => info!("Status: {}.", status),
            Status::Warning => warn!("Status: {}.", status),
        }
    }
}

#[derive(Debug)]
struct Health {
    status: Option<Status>,
    state: ConnectionState,
}

/// Tracks connection state and health, forwarding status changes to a [`StatusReporter`].
///
/// Repeated warnings while already degraded are not forwarded.
pub struct HealthMonitor {
    health: Mutex<Health>,
    reporter: Box<dyn StatusReporter>,
}

impl HealthMonitor {
    pub fn new(reporter: Box<dyn StatusReporter>) -> Self {
        HealthMonitor {
            health: Mutex::new(Health {
                status: None,
                state: ConnectionState::Disconnected,
            }),
            reporter,
        }
    }

    fn with_health<T>(&self, f: impl FnOnce(&mut Health) -> T) -> T {
        let mut health = self.health.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut health)
    }

    /// Last reported status, `None` before the first report.
    pub fn status(&self) -> Option<Status> {
        self.with_health(|h| h.status)
    }

    pub fn state(&self) -> ConnectionState {
        self.with_health(|h| h.state)
    }

    pub fn transition(&self, next: ConnectionState) {
        let prev = self.with_health(|h| std::mem::replace(&mut h.state, next));
        if prev != next {
            debug!("Connection state: {} -> {}.", prev, next);
        }
    }

    pub fn set_ok(&self) {
        self.with_health(|h| h.status = Some(Status::Ok));
        self.reporter.set_status(Status::Ok);
    }

    /// Marks the component degraded. Returns `false` if it already was.
    pub fn set_warning(&self) -> bool {
        let changed = self.with_health(|h| {
            let changed = h.status != Some(Status::Warning);
            h.status = Some(Status::Warning);
            changed
        });
        if changed {
            self.reporter.set_status(Status::Warning);
        }
        changed
    }
}
