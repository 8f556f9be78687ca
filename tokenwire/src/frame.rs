//! Tokenized log framer.
//!
//! Wire format, one frame per log statement:
//!
//! ```text
//! '$' <base64(payload)> '\n'
//! ```
//!
//! The payload (token + encoded arguments, see [`crate::payload`]) is treated
//! as an opaque byte sequence and Base64-encoded with the standard RFC 4648
//! alphabet, streamed straight onto the byte sink without buffering the
//! encoded text. A reader delimits frames on `\n` and discards anything
//! before a `$` as line noise.
//!
//! The metadata word is accepted for API symmetry with the log call sites but
//! is not written to the wire: level and line are recovered out-of-band from
//! the token database, not from the stream.

/// Byte-oriented transmit primitive supplied by the surrounding firmware.
///
/// The framer assumes exclusive access to the sink for the duration of one
/// `emit` call; callers on a multi-tasked host must serialize frame emission
/// themselves to keep frames atomic on the wire.
pub trait ByteSink {
    type Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;
}

/// Log severity, 3-bit field of the metadata word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Level {
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

/// Packed level/line metadata word.
///
/// Layout: bits 0..3 level, bits 3..14 source line (0 when the line number
/// does not fit in 11 bits), upper bits reserved. The framer passes this
/// through untouched; it exists so call sites carry severity and origin in
/// one register-sized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Metadata(u32);

const LEVEL_BITS: u32 = 3;
const LINE_BITS: u32 = 11;

impl Metadata {
    pub const fn new(level: Level, line: u32) -> Self {
        let line = if line < (1 << LINE_BITS) { line } else { 0 };
        Metadata((level as u32) | (line << LEVEL_BITS))
    }

    pub const fn level_bits(self) -> u32 {
        self.0 & ((1 << LEVEL_BITS) - 1)
    }

    pub const fn line(self) -> u32 {
        (self.0 >> LEVEL_BITS) & ((1 << LINE_BITS) - 1)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

const BASE64_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn base64_char(index: u32) -> u8 {
    BASE64_TABLE[(index & 0x3F) as usize]
}

/// Writes one complete frame for `payload` to `sink`.
///
/// Total over all payload lengths; an empty payload produces the two-byte
/// frame `$\n`. The first sink failure aborts the frame immediately and
/// propagates — a partial frame is never reported as complete.
pub fn emit<S: ByteSink>(
    sink: &mut S,
    _metadata: Metadata,
    payload: &[u8],
) -> Result<(), S::Error> {
    sink.write_byte(b'$')?;

    // 3 input bytes -> 24 bits -> four 6-bit indices, MSB first.
    let mut groups = payload.chunks_exact(3);
    for group in groups.by_ref() {
        let bits =
            (group[0] as u32) << 16 | (group[1] as u32) << 8 | group[2] as u32;
        sink.write_byte(base64_char(bits >> 18))?;
        sink.write_byte(base64_char(bits >> 12))?;
        sink.write_byte(base64_char(bits >> 6))?;
        sink.write_byte(base64_char(bits))?;
    }

    // Tail of 1 or 2 bytes, '='-padded to a full 4-char group.
    let tail = groups.remainder();
    match *tail {
        [] => {}
        [a] => {
            let bits = (a as u32) << 16;
            sink.write_byte(base64_char(bits >> 18))?;
            sink.write_byte(base64_char(bits >> 12))?;
            sink.write_byte(b'=')?;
            sink.write_byte(b'=')?;
        }
        [a, b] => {
            let bits = (a as u32) << 16 | (b as u32) << 8;
            sink.write_byte(base64_char(bits >> 18))?;
            sink.write_byte(base64_char(bits >> 12))?;
            sink.write_byte(base64_char(bits >> 6))?;
            sink.write_byte(b'=')?;
        }
        _ => {}
    }

    sink.write_byte(b'\n')
}
