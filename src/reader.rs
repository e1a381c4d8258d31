use std::sync::Arc;
use std::thread;

use tracing::{debug, error};

use crate::connection::StopSignal;
use crate::decoder::decode_record;
use crate::device::DeviceHandle;
use crate::error::DeviceError;
use crate::events::{BarcodeEvent, EventSink};
use crate::framing::RecordFramer;
use crate::status::{ConnectionState, HealthMonitor};

/// Why a read session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// Termination was requested; do not reconnect.
    Stopped,
    /// The handle failed; reconnect.
    Failed(DeviceError),
}

/// One read session: owns the handle until it stops or fails, framing bytes into records and
/// emitting one [`BarcodeEvent`] per record.
pub struct DelimitedReader {
    handle: Box<dyn DeviceHandle>,
    framer: RecordFramer,
    stop: StopSignal,
    events: Arc<dyn EventSink>,
    health: Arc<HealthMonitor>,
}

impl DelimitedReader {
    pub fn new(
        handle: Box<dyn DeviceHandle>,
        stop: StopSignal,
        events: Arc<dyn EventSink>,
        health: Arc<HealthMonitor>,
    ) -> Self {
        DelimitedReader {
            handle,
            framer: RecordFramer::new(),
            stop,
            events,
            health,
        }
    }

    /// Reads until stopped or until the handle fails. The handle is closed before returning.
    pub fn run(mut self) -> SessionEnd {
        let thread_name = thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        debug!("Reader thread {} spawned.", thread_name);
        self.health.transition(ConnectionState::Reading);

        let end = loop {
            if self.stop.is_stopped() {
                break SessionEnd::Stopped;
            }

            match self.handle.read_byte() {
                Ok(Some(byte)) => {
                    if let Some(record) = self.framer.push(byte) {
                        self.emit(&record);
                    }
                }
                Ok(None) => continue,
                Err(e) => {
                    if self.stop.is_stopped() {
                        debug!("Read ended by shutdown: {}.", e);
                        break SessionEnd::Stopped;
                    }
                    self.health.transition(ConnectionState::Failing);
                    self.health.set_warning();
                    error!("Read operation from HID device failed: {}.", e);
                    break SessionEnd::Failed(e);
                }
            }
        };

        if !self.framer.pending().is_empty() {
            debug!("Discarding {} bytes of a partial record.", self.framer.pending().len());
        }
        drop(self.handle);
        self.health.transition(ConnectionState::Disconnected);
        debug!("Reader thread {} completed.", thread_name);
        end
    }

    fn emit(&self, record: &[u8]) {
        let barcode = match decode_record(record) {
            Ok(barcode) => Some(barcode),
            Err(e) => {
                error!("Failed to decode barcode: {}.", e);
                None
            }
        };
        self.events.notify(BarcodeEvent { barcode });
    }
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::unbounded;

    use super::*;
    use crate::device::mock::MockOpener;
    use crate::device::DeviceOpener;
    use crate::status::{Status, TracingStatusReporter};

    fn run_session(opener: &mut MockOpener, stop: StopSignal) -> (SessionEnd, Vec<BarcodeEvent>) {
        let (tx, rx) = unbounded::<BarcodeEvent>();
        let health = Arc::new(HealthMonitor::new(Box::new(TracingStatusReporter)));
        let handle = match opener.open() {
            Ok(handle) => handle,
            Err(e) => panic!("mock open failed: {e}"),
        };
        let end = DelimitedReader::new(handle, stop, Arc::new(tx), health).run();
        (end, rx.try_iter().collect())
    }

    #[test]
    fn emits_records_until_failure() {
        // "Ab", empty record, then a partial record cut off by the unplug.
        let mut opener =
            MockOpener::new().session_then_unplug(&[0x02, 0x04, 0x05, 0x28, 0x28, 0x06]);
        let (end, events) = run_session(&mut opener, StopSignal::new());

        assert!(matches!(end, SessionEnd::Failed(DeviceError::Read(_))));
        assert_eq!(
            events,
            vec![
                BarcodeEvent {
                    barcode: Some("Ab".to_string())
                },
                BarcodeEvent {
                    barcode: Some(String::new())
                },
            ]
        );
        assert_eq!(opener.closed(), 1);
    }

    #[test]
    fn undecodable_record_emits_none_and_continues() {
        let mut opener = MockOpener::new().session_then_unplug(&[0xff, 0x28, 0x04, 0x28]);
        let (_, events) = run_session(&mut opener, StopSignal::new());

        assert_eq!(
            events,
            vec![
                BarcodeEvent { barcode: None },
                BarcodeEvent {
                    barcode: Some("a".to_string())
                },
            ]
        );
    }

    #[test]
    fn stop_before_read_ends_session_without_failure() {
        let mut opener = MockOpener::new().session_then_unplug(&[0x04, 0x28]);
        let stop = StopSignal::new();
        stop.stop();
        let (end, events) = run_session(&mut opener, stop);

        assert!(matches!(end, SessionEnd::Stopped));
        assert!(events.is_empty());
        assert_eq!(opener.closed(), 1);
    }

    /// A handle whose read fails because shutdown closed it underneath the reader.
    struct ClosedByShutdown(StopSignal);

    impl DeviceHandle for ClosedByShutdown {
        fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
            self.0.stop();
            Err(DeviceError::Closed)
        }
    }

    #[test]
    fn read_error_during_shutdown_is_not_a_failure() {
        let (tx, _rx) = unbounded::<BarcodeEvent>();
        let (status_tx, statuses) = unbounded::<Status>();
        let health = Arc::new(HealthMonitor::new(Box::new(status_tx)));
        let stop = StopSignal::new();

        let reader = DelimitedReader::new(
            Box::new(ClosedByShutdown(stop.clone())),
            stop,
            Arc::new(tx),
            Arc::clone(&health),
        );
        assert!(matches!(reader.run(), SessionEnd::Stopped));
        assert!(statuses.try_recv().is_err());
        assert_eq!(health.state(), ConnectionState::Disconnected);
    }
}
