use tracing::debug;

use crate::constants::{MODIFIER, NULL_BYTE, ZERO_RUN_THRESHOLD};
use crate::error::DecodeError;
use crate::hid_map;

/// Decodes one record (delimiter excluded) into the scanned string.
///
/// A `MODIFIER` byte shifts exactly the next mapped byte. Null bytes are skipped, but a run of
/// more than `ZERO_RUN_THRESHOLD` of them clears a pending shift: some scanners report the shift
/// bit in reports that carry no key at all.
///
/// # Errors
///
/// Returns [`DecodeError::UnmappedScanCode`] for the first byte that has no entry in the
/// scan-code table.
#[tracing::instrument(level = "trace", skip(record))]
pub fn decode_record(record: &[u8]) -> Result<String, DecodeError> {
    debug!("Decoding {} bytes.", record.len());
    debug!("Buffer: {:02x?}", record);

    let mut shifted = false;
    let mut zero_run = 0usize;
    let mut output = String::with_capacity(record.len() / 2);

    for (position, &byte) in record.iter().enumerate() {
        if byte == NULL_BYTE {
            zero_run += 1;
            if zero_run > ZERO_RUN_THRESHOLD {
                shifted = false;
            }
            continue;
        }
        zero_run = 0;

        if byte == MODIFIER {
            shifted = true;
            continue;
        }

        let c = hid_map::lookup(shifted, byte).ok_or(DecodeError::UnmappedScanCode {
            code: byte,
            shifted,
            position,
        })?;
        output.push(c);
        shifted = false;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_decodes_to_empty_string() {
        assert_eq!(decode_record(&[]), Ok(String::new()));
    }

    #[test]
    fn plain_keys() {
        assert_eq!(decode_record(&[0x0b, 0x08, 0x0f, 0x0f, 0x12]), Ok("hello".to_string()));
    }

    #[test]
    fn modifier_applies_to_one_key() {
        assert_eq!(decode_record(&[0x02, 0x04, 0x04]), Ok("Aa".to_string()));
    }

    #[test]
    fn keyboard_reports_decode() {
        // Two boot keyboard reports: shift+'a', then '1'.
        let record = [
            0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x1e, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(decode_record(&record), Ok("A1".to_string()));
    }

    #[test]
    fn three_nulls_clear_shift() {
        assert_eq!(decode_record(&[0x02, 0x00, 0x00, 0x00, 0x04]), Ok("a".to_string()));
    }

    #[test]
    fn two_nulls_keep_shift() {
        assert_eq!(decode_record(&[0x02, 0x00, 0x00, 0x04]), Ok("A".to_string()));
    }

    #[test]
    fn zero_run_is_reset_by_non_null() {
        // The run is broken by 0x05, so the second pair of nulls does not clear the shift.
        assert_eq!(
            decode_record(&[0x00, 0x00, 0x05, 0x02, 0x00, 0x00, 0x04]),
            Ok("bA".to_string())
        );
    }

    #[test]
    fn repeated_modifier_is_still_one_shift() {
        assert_eq!(decode_record(&[0x02, 0x02, 0x05, 0x05]), Ok("Bb".to_string()));
    }

    #[test]
    fn trailing_modifier_produces_nothing() {
        assert_eq!(decode_record(&[0x05, 0x02]), Ok("b".to_string()));
    }

    #[test]
    fn unmapped_code_is_an_error() {
        assert_eq!(
            decode_record(&[0x04, 0x02, 0xff]),
            Err(DecodeError::UnmappedScanCode {
                code: 0xff,
                shifted: true,
                position: 2,
            })
        );
    }
}
