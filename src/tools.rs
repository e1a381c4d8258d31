use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,hid_barcode_scanner=debug";

/// Initializes the global logging facility.
///
/// If `RUST_LOG` is not set, the global default logging level is `info`, and `debug` for this
/// crate.
///
/// Log messages are written to standard error, leaving standard output to scanned barcodes.
/// Does nothing if a global subscriber is already installed.
pub fn initialize_logging(json_output: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true);

    let result = if json_output {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
