use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel::{unbounded, RecvTimeoutError};
use tracing::info;

use hid_barcode_scanner::constants::COMPONENT_VERSION;
use hid_barcode_scanner::status::TracingStatusReporter;
use hid_barcode_scanner::{
    device, tools, Backend, BarcodeEvent, BarcodeScannerServer, ScannerConfig,
};

// A USB barcode scanner in keyboard mode reports every symbol as a boot keyboard input report:
// a modifier byte, a reserved byte and up to six key usages. Reading the hidraw node directly
// gets those reports without the scanner typing into whatever window has focus.

#[derive(Parser)]
#[command(name = "hid-barcode-scanner", version = COMPONENT_VERSION)]
#[command(about = "Prints one JSON line per barcode scanned on a USB HID scanner")]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "BARCODE_CONFIG")]
    config: Option<PathBuf>,

    /// Device file to read, e.g. /dev/hidraw0
    #[arg(short, long, env = "BARCODE_DEVICE")]
    device: Option<PathBuf>,

    /// Delay between attempts to open the device, in milliseconds
    #[arg(long)]
    reconnect_interval_ms: Option<u64>,

    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Log as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> Result<ScannerConfig> {
        let mut config = match &self.config {
            Some(path) => ScannerConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ScannerConfig::default(),
        };
        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(interval) = self.reconnect_interval_ms {
            config.reconnect_interval_ms = interval;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        config.json_logs |= self.json_logs;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    tools::initialize_logging(config.json_logs);
    info!("Starting HID barcode scanner {}.", COMPONENT_VERSION);

    let opener = device::opener_for(&config)?;
    let (events, scans) = unbounded::<BarcodeEvent>();
    let mut server = BarcodeScannerServer::new(
        opener,
        config.reconnect_interval(),
        Arc::new(events),
        Box::new(TracingStatusReporter),
    );

    let stop = server.stop_signal();
    ctrlc::set_handler(move || {
        stop.stop();
    })
    .context("failed to install Ctrl-C handler")?;

    server.start().context("failed to start scanner")?;

    let stop = server.stop_signal();
    while !stop.is_stopped() {
        match scans.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    server.stop();
    server.join();
    info!("Stopped.");
    Ok(())
}
