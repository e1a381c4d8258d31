use std::time::Duration;

/// Version of the scanner component, reported by the binary.
pub static COMPONENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// End-of-record byte. The scanner terminates every barcode with the HID "Enter" usage.
pub const DELIMITER: u8 = 0x28;

/// Left-shift modifier bit as it appears in a boot keyboard report.
pub const MODIFIER: u8 = 0x02;

/// Empty key slot / reserved byte.
pub const NULL_BYTE: u8 = 0x00;

/// More than this many consecutive null bytes clears a pending shift.
pub const ZERO_RUN_THRESHOLD: usize = 2;

/// Device opened when nothing else is configured.
pub static DEFAULT_DEVICE_PATH: &str = "/dev/hidraw0";

/// Delay between two attempts to open the device.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// How long a timed read waits before the reader re-checks for shutdown.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_version_is_the_package_version() {
        assert_eq!(COMPONENT_VERSION, env!("CARGO_PKG_VERSION"));
        let parts: Vec<&str> = COMPONENT_VERSION.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.parse::<u32>().is_ok()));
    }
}
