//! Decoding of single records, including the noise patterns scanners are known to produce.

use hid_barcode_scanner::constants::{DELIMITER, MODIFIER};
use hid_barcode_scanner::hid_map;
use hid_barcode_scanner::{decode_record, DecodeError};

#[test]
fn empty_record() {
    assert_eq!(decode_record(&[]), Ok(String::new()));
}

#[test]
fn three_nulls_after_modifier_look_up_unshifted() {
    // 0x41 has no character in either half; the error shows which half was consulted.
    assert_eq!(
        decode_record(&[0x02, 0x00, 0x00, 0x00, 0x41]),
        Err(DecodeError::UnmappedScanCode {
            code: 0x41,
            shifted: false,
            position: 4,
        })
    );
}

#[test]
fn three_nulls_after_modifier_decode_mapped_key_unshifted() {
    assert_eq!(decode_record(&[0x02, 0x00, 0x00, 0x00, 0x04]), Ok("a".to_string()));
}

#[test]
fn two_nulls_after_modifier_look_up_shifted() {
    assert_eq!(
        decode_record(&[0x02, 0x00, 0x00, 0x41]),
        Err(DecodeError::UnmappedScanCode {
            code: 0x41,
            shifted: true,
            position: 3,
        })
    );
}

#[test]
fn two_nulls_after_modifier_decode_mapped_key_shifted() {
    assert_eq!(decode_record(&[0x02, 0x00, 0x00, 0x04]), Ok("A".to_string()));
}

#[test]
fn modifier_never_produces_output() {
    assert_eq!(decode_record(&[MODIFIER]), Ok(String::new()));
    assert_eq!(decode_record(&[MODIFIER, MODIFIER, 0x00]), Ok(String::new()));
}

#[test]
fn modifier_then_unmapped_byte_fails_on_the_lookup() {
    assert_eq!(
        decode_record(&[MODIFIER, 0x99]),
        Err(DecodeError::UnmappedScanCode {
            code: 0x99,
            shifted: true,
            position: 1,
        })
    );
}

#[test]
fn delimiter_inside_a_record_is_not_a_character() {
    // The framer never hands the delimiter to the decoder; if it does, it is not mapped.
    assert!(decode_record(&[DELIMITER]).is_err());
}

#[test]
fn every_table_entry_round_trips() {
    for (shifted, code, c) in hid_map::entries() {
        let record: Vec<u8> = if shifted {
            vec![MODIFIER, code]
        } else {
            vec![code]
        };
        assert_eq!(decode_record(&record), Ok(c.to_string()), "code {code:#04x}");
    }
}

#[test]
fn realistic_scan() {
    // "Ab-12" as sent by a scanner: 8-byte keyboard reports, each followed by a key-up report.
    let mut record = Vec::new();
    for (modifier, key) in [(0x02, 0x04), (0x00, 0x05), (0x00, 0x2d), (0x00, 0x1e), (0x00, 0x1f)] {
        record.extend_from_slice(&[modifier, 0x00, key, 0x00, 0x00, 0x00, 0x00, 0x00]);
        record.extend_from_slice(&[0x00; 8]);
    }
    assert_eq!(decode_record(&record), Ok("Ab-12".to_string()));
}
