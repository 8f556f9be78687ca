//! Build-metadata record encoder.
//!
//! The firmware image carries a fixed 71-byte record so host tooling can
//! identify exactly which source tree produced a binary: locate the "META"
//! sentinel (or dump the dedicated link section), read the record, recompute
//! the CRC. Everything is computed at compile time; nothing here runs on the
//! target.
//!
//! Record layout (little-endian, no padding between fields):
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!  0       4    magic    "META"  (no NUL; parser sentinel)
//!  4       9    commit   8-char git hash + NUL
//! 13       1    dirty    0 = clean, 1 = working tree modified at build time
//! 14      32    branch   branch name (up to 31 chars) + NUL
//! 46      12    date     "Mmm dd YYYY" + NUL
//! 58       9    time     "HH:MM:SS" + NUL
//! 67       4    crc32    CRC-32 over commit+dirty+branch+date+time (LE)
//! ```
//!
//! The CRC covers the stored field bytes without their NUL padding, so a
//! reader that strips trailing zeros per field recomputes the same value
//! (Python: `zlib.crc32(commit + bytes([dirty]) + branch + date + time)`).
//! Overlong inputs are silently truncated to the field width minus the
//! terminator; the record size never changes.

/// Total record size in bytes. External readers depend on this value.
pub const RECORD_SIZE: usize = 71;

/// Sentinel marking the record inside an otherwise undifferentiated image.
pub const MAGIC: &[u8; 4] = b"META";

pub const COMMIT_OFFSET: usize = 4;
pub const COMMIT_SIZE: usize = 9;
pub const DIRTY_OFFSET: usize = 13;
pub const BRANCH_OFFSET: usize = 14;
pub const BRANCH_SIZE: usize = 32;
pub const DATE_OFFSET: usize = 46;
pub const DATE_SIZE: usize = 12;
pub const TIME_OFFSET: usize = 58;
pub const TIME_SIZE: usize = 9;
pub const CRC_OFFSET: usize = 67;

// Layout invariant: fields tile the record exactly.
const _: () = assert!(COMMIT_OFFSET == MAGIC.len());
const _: () = assert!(DIRTY_OFFSET == COMMIT_OFFSET + COMMIT_SIZE);
const _: () = assert!(BRANCH_OFFSET == DIRTY_OFFSET + 1);
const _: () = assert!(DATE_OFFSET == BRANCH_OFFSET + BRANCH_SIZE);
const _: () = assert!(TIME_OFFSET == DATE_OFFSET + DATE_SIZE);
const _: () = assert!(CRC_OFFSET == TIME_OFFSET + TIME_SIZE);
const _: () = assert!(RECORD_SIZE == CRC_OFFSET + 4);

const CRC_POLY: u32 = 0xEDB8_8320;

const fn crc_byte(mut crc: u32, byte: u8) -> u32 {
    crc ^= byte as u32;
    let mut i = 0;
    while i < 8 {
        crc = (crc >> 1) ^ (CRC_POLY & 0u32.wrapping_sub(crc & 1));
        i += 1;
    }
    crc
}

const fn crc_range(mut crc: u32, data: &[u8], start: usize, len: usize) -> u32 {
    let mut i = 0;
    while i < len {
        crc = crc_byte(crc, data[start + i]);
        i += 1;
    }
    crc
}

/// CRC-32, IEEE 802.3 / gzip variant: init 0xFFFFFFFF, reflected polynomial
/// 0xEDB88320, final XOR 0xFFFFFFFF. Bit-identical to `zlib.crc32`.
pub const fn crc32(data: &[u8]) -> u32 {
    crc_range(0xFFFF_FFFF, data, 0, data.len()) ^ 0xFFFF_FFFF
}

/// Copies `s` into the record at `offset`, truncated to `width - 1` bytes
/// (the last byte of the field stays NUL). Returns the number of bytes
/// actually stored, which is also the field's CRC coverage.
const fn copy_field(record: &mut [u8; RECORD_SIZE], offset: usize, width: usize, s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < width - 1 && i < bytes.len() {
        record[offset + i] = bytes[i];
        i += 1;
    }
    i
}

/// Builds the complete 71-byte record.
///
/// `const`, so the firmware initializes its link-section static with it and
/// the record never exists as mutable data at runtime. No failure path:
/// overlong strings truncate, empty strings leave an all-NUL field.
pub const fn encode_record(
    commit: &str,
    dirty: bool,
    branch: &str,
    date: &str,
    time: &str,
) -> [u8; RECORD_SIZE] {
    let mut record = [0u8; RECORD_SIZE];

    let mut i = 0;
    while i < MAGIC.len() {
        record[i] = MAGIC[i];
        i += 1;
    }

    let commit_len = copy_field(&mut record, COMMIT_OFFSET, COMMIT_SIZE, commit);
    record[DIRTY_OFFSET] = if dirty { 1 } else { 0 };
    let branch_len = copy_field(&mut record, BRANCH_OFFSET, BRANCH_SIZE, branch);
    let date_len = copy_field(&mut record, DATE_OFFSET, DATE_SIZE, date);
    let time_len = copy_field(&mut record, TIME_OFFSET, TIME_SIZE, time);

    // CRC over the stored, unpadded field bytes in declared order.
    let mut crc = 0xFFFF_FFFFu32;
    crc = crc_range(crc, &record, COMMIT_OFFSET, commit_len);
    crc = crc_byte(crc, record[DIRTY_OFFSET]);
    crc = crc_range(crc, &record, BRANCH_OFFSET, branch_len);
    crc = crc_range(crc, &record, DATE_OFFSET, date_len);
    crc = crc_range(crc, &record, TIME_OFFSET, time_len);
    crc ^= 0xFFFF_FFFF;

    let crc_bytes = crc.to_le_bytes();
    record[CRC_OFFSET] = crc_bytes[0];
    record[CRC_OFFSET + 1] = crc_bytes[1];
    record[CRC_OFFSET + 2] = crc_bytes[2];
    record[CRC_OFFSET + 3] = crc_bytes[3];

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// What an external reader does: strip trailing NULs per field, then
    /// CRC the concatenation commit + dirty + branch + date + time.
    fn reader_crc(record: &[u8; RECORD_SIZE]) -> u32 {
        fn stripped(record: &[u8; RECORD_SIZE], offset: usize, width: usize) -> &[u8] {
            let field = &record[offset..offset + width];
            let end = field.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
            &field[..end]
        }
        let mut payload = Vec::new();
        payload.extend_from_slice(stripped(record, COMMIT_OFFSET, COMMIT_SIZE));
        payload.push(record[DIRTY_OFFSET]);
        payload.extend_from_slice(stripped(record, BRANCH_OFFSET, BRANCH_SIZE));
        payload.extend_from_slice(stripped(record, DATE_OFFSET, DATE_SIZE));
        payload.extend_from_slice(stripped(record, TIME_OFFSET, TIME_SIZE));
        crc32(&payload)
    }

    fn stored_crc(record: &[u8; RECORD_SIZE]) -> u32 {
        u32::from_le_bytes(record[CRC_OFFSET..].try_into().unwrap())
    }

    #[test]
    fn crc32_matches_published_vectors() {
        assert_eq!(crc32(b"123456789"), 0xCBF43926);
        assert_eq!(crc32(b""), 0x0000_0000);
        assert_eq!(crc32(b"The quick brown fox jumps over the lazy dog"), 0x414FA339);
    }

    #[test]
    fn record_layout_and_fields() {
        let record =
            encode_record("1a2b3c4d", true, "main", "Aug 23 2026", "12:34:56");
        assert_eq!(record.len(), RECORD_SIZE);
        assert_eq!(&record[..4], MAGIC);
        assert_eq!(&record[COMMIT_OFFSET..COMMIT_OFFSET + 8], b"1a2b3c4d");
        assert_eq!(record[COMMIT_OFFSET + 8], 0); // commit terminator
        assert_eq!(record[DIRTY_OFFSET], 1);
        assert_eq!(&record[BRANCH_OFFSET..BRANCH_OFFSET + 4], b"main");
        // Rest of the branch field stays NUL.
        assert!(record[BRANCH_OFFSET + 4..DATE_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(&record[DATE_OFFSET..DATE_OFFSET + 11], b"Aug 23 2026");
        assert_eq!(&record[TIME_OFFSET..TIME_OFFSET + 8], b"12:34:56");
    }

    #[test]
    fn stored_crc_matches_external_reader() {
        let record =
            encode_record("deadbeef", false, "feature/uart", "Jan  1 2026", "00:00:00");
        assert_eq!(stored_crc(&record), reader_crc(&record));
    }

    #[test]
    fn overlong_branch_truncates_without_changing_size() {
        let long = "a-branch-name-well-beyond-the-thirty-one-character-limit";
        let record = encode_record("deadbeef", false, long, "Aug 23 2026", "12:00:00");
        assert_eq!(record.len(), RECORD_SIZE);
        assert_eq!(
            &record[BRANCH_OFFSET..BRANCH_OFFSET + BRANCH_SIZE - 1],
            &long.as_bytes()[..BRANCH_SIZE - 1]
        );
        assert_eq!(record[BRANCH_OFFSET + BRANCH_SIZE - 1], 0);
        // CRC covers the truncated bytes, so the reader still verifies.
        assert_eq!(stored_crc(&record), reader_crc(&record));
    }

    #[test]
    fn overlong_commit_truncates_to_eight_chars() {
        let record =
            encode_record("0123456789abcdef", false, "main", "Aug 23 2026", "12:00:00");
        assert_eq!(&record[COMMIT_OFFSET..COMMIT_OFFSET + 8], b"01234567");
        assert_eq!(record[COMMIT_OFFSET + 8], 0);
        assert_eq!(stored_crc(&record), reader_crc(&record));
    }

    #[test]
    fn empty_strings_are_accepted() {
        let record = encode_record("", false, "", "", "");
        assert_eq!(record.len(), RECORD_SIZE);
        assert_eq!(&record[..4], MAGIC);
        // Payload is the single dirty byte 0x00.
        assert_eq!(stored_crc(&record), crc32(&[0]));
    }

    #[test]
    fn encoding_is_const_evaluable() {
        const RECORD: [u8; RECORD_SIZE] =
            encode_record("cafef00d", true, "main", "Aug 23 2026", "23:59:59");
        assert_eq!(&RECORD[..4], MAGIC);
    }

    #[test]
    fn dirty_flag_changes_the_crc() {
        let clean = encode_record("cafef00d", false, "main", "Aug 23 2026", "12:00:00");
        let dirty = encode_record("cafef00d", true, "main", "Aug 23 2026", "12:00:00");
        assert_ne!(stored_crc(&clean), stored_crc(&dirty));
    }
}
