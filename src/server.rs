use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::connection::{ConnectionManager, StopSignal};
use crate::device::DeviceOpener;
use crate::error::DeviceError;
use crate::events::EventSink;
use crate::reader::{DelimitedReader, SessionEnd};
use crate::status::{HealthMonitor, StatusReporter};

/// Supervises the scanner: connects, runs one reader thread per session, and reconnects after a
/// device failure until stopped.
pub struct BarcodeScannerServer {
    pending: Option<ConnectionManager>,
    events: Arc<dyn EventSink>,
    health: Arc<HealthMonitor>,
    stop: StopSignal,
    supervisor: Option<JoinHandle<()>>,
}

impl BarcodeScannerServer {
    pub fn new(
        opener: Box<dyn DeviceOpener>,
        retry_interval: Duration,
        events: Arc<dyn EventSink>,
        reporter: Box<dyn StatusReporter>,
    ) -> Self {
        let health = Arc::new(HealthMonitor::new(reporter));
        let stop = StopSignal::new();
        info!(
            "Creating barcode scanner server for device: {}",
            opener.describe()
        );
        let manager =
            ConnectionManager::new(opener, retry_interval, stop.clone(), Arc::clone(&health));

        BarcodeScannerServer {
            pending: Some(manager),
            events,
            health,
            stop,
            supervisor: None,
        }
    }

    /// Spawns the supervisor thread. Calling it a second time does nothing.
    ///
    /// # Errors
    ///
    /// Fails if the thread cannot be spawned.
    pub fn start(&mut self) -> io::Result<()> {
        let Some(manager) = self.pending.take() else {
            debug!("Server already started.");
            return Ok(());
        };
        info!("Starting server.");

        let events = Arc::clone(&self.events);
        let health = Arc::clone(&self.health);
        let supervisor = thread::Builder::new()
            .name("barcode-supervisor".to_string())
            .spawn(move || supervise(manager, events, health))?;
        self.supervisor = Some(supervisor);
        Ok(())
    }

    /// Requests shutdown without waiting for it. Never triggers a reconnect.
    pub fn stop(&self) {
        if self.stop.stop() {
            info!("Stopping server.");
        }
    }

    /// Waits for the supervisor, and with it the current reader, to exit.
    pub fn join(&mut self) {
        if let Some(supervisor) = self.supervisor.take() {
            if supervisor.join().is_err() {
                error!("Supervisor thread panicked.");
            }
        }
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn health(&self) -> Arc<HealthMonitor> {
        Arc::clone(&self.health)
    }
}

impl Drop for BarcodeScannerServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[tracing::instrument(skip_all)]
fn supervise(
    mut manager: ConnectionManager,
    events: Arc<dyn EventSink>,
    health: Arc<HealthMonitor>,
) {
    let stop = manager.stop_signal().clone();
    let mut session = 0u64;

    while let Some(handle) = manager.connect() {
        session += 1;
        let reader = DelimitedReader::new(
            handle,
            stop.clone(),
            Arc::clone(&events),
            Arc::clone(&health),
        );

        let end = match thread::Builder::new()
            .name(format!("barcode-reader-{}", session))
            .spawn(move || reader.run())
        {
            Ok(reader_thread) => match reader_thread.join() {
                Ok(end) => end,
                Err(_) => {
                    error!("Reader thread panicked.");
                    SessionEnd::Failed(DeviceError::Closed)
                }
            },
            Err(e) => {
                error!("Failed to spawn reader thread: {}.", e);
                SessionEnd::Failed(DeviceError::Read(e))
            }
        };

        match end {
            SessionEnd::Stopped => break,
            SessionEnd::Failed(e) => debug!("Session {} ended ({}), reconnecting.", session, e),
        }
    }

    manager.disconnect();
    info!("Server stopped after {} session(s).", session);
}
