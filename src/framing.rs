use std::mem;

use crate::constants::DELIMITER;

/// Splits a byte stream into records terminated by [`DELIMITER`].
///
/// The framer only accumulates; decoding is left to the caller.
#[derive(Debug, Default)]
pub struct RecordFramer {
    buffer: Vec<u8>,
}

impl RecordFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte. Returns the completed record (delimiter excluded) when `byte` is the
    /// delimiter, leaving the framer empty for the next record.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        if byte == DELIMITER {
            Some(mem::take(&mut self.buffer))
        } else {
            self.buffer.push(byte);
            None
        }
    }

    /// Feeds a chunk of bytes, returning every record completed by it in order.
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Bytes received since the last delimiter.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Drops a partial record.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
