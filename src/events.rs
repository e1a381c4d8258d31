use crossbeam::channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One completed scan. `barcode` is `None` when the record could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeEvent {
    pub barcode: Option<String>,
}

/// Downstream consumer of scans. Delivery is fire-and-forget.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: BarcodeEvent);
}

impl EventSink for Sender<BarcodeEvent> {
    fn notify(&self, event: BarcodeEvent) {
        if let Err(e) = self.send(event) {
            debug!("Dropping {:?}, no receiver.", e.into_inner());
        }
    }
}
