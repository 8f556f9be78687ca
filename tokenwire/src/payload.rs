//! Log payload builder: token + varint-encoded arguments.
//!
//! On the wire a payload is the 4-byte little-endian token of the format
//! string followed by its arguments, unsigned ones as LEB128 varints, signed
//! ones ZigZag-mapped first, strings as a length byte plus raw bytes. The
//! framer ([`crate::frame`]) never looks inside; this module is the producer
//! side used by the firmware's `token_log!` macro.
//!
//! Tokens are FNV-1a hashes of the format string, computed at compile time.
//! Resolving tokens back to text is an offline concern (a database built from
//! the source tree), deliberately out of scope here.

/// Compile-time token for a format string (FNV-1a, 32-bit).
pub const fn token(format_string: &str) -> u32 {
    let bytes = format_string.as_bytes();
    let mut hash = 0x811C_9DC5u32;
    let mut i = 0;
    while i < bytes.len() {
        hash = (hash ^ bytes[i] as u32).wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// Fixed-capacity payload buffer, no heap.
///
/// Arguments whose complete encoding does not fit are dropped whole — a
/// partial varint would corrupt everything after it, so truncation is
/// all-or-nothing per argument.
pub struct Payload<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Payload<N> {
    /// Starts a payload with the little-endian token. `N` must hold at
    /// least the token itself.
    pub fn new(token: u32) -> Self {
        const { assert!(N >= 4) }
        let mut p = Payload { buf: [0; N], len: 0 };
        let t = token.to_le_bytes();
        p.buf[..4].copy_from_slice(&t);
        p.len = 4;
        p
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn remaining(&self) -> usize {
        N - self.len
    }

    /// Appends a LEB128 varint; drops the argument if it cannot fit whole.
    pub fn push_varint(&mut self, mut value: u32) {
        let needed = varint_len(value);
        if needed > self.remaining() {
            return;
        }
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buf[self.len] = byte;
                self.len += 1;
                return;
            }
            self.buf[self.len] = byte | 0x80;
            self.len += 1;
        }
    }

    /// Appends a signed value as a ZigZag-mapped varint.
    pub fn push_svarint(&mut self, value: i32) {
        self.push_varint(zigzag(value));
    }

    /// Appends a length-prefixed byte string (at most 255 bytes kept).
    pub fn push_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = bytes.len().min(255);
        if 1 + len > self.remaining() {
            return;
        }
        self.buf[self.len] = len as u8;
        self.buf[self.len + 1..self.len + 1 + len].copy_from_slice(&bytes[..len]);
        self.len += 1 + len;
    }
}

const fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

const fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Encoding hook for heterogeneous log arguments.
pub trait LogArg {
    fn encode<const N: usize>(&self, payload: &mut Payload<N>);
}

macro_rules! unsigned_arg {
    ($($ty:ty),*) => {$(
        impl LogArg for $ty {
            fn encode<const N: usize>(&self, payload: &mut Payload<N>) {
                payload.push_varint(*self as u32);
            }
        }
    )*};
}

macro_rules! signed_arg {
    ($($ty:ty),*) => {$(
        impl LogArg for $ty {
            fn encode<const N: usize>(&self, payload: &mut Payload<N>) {
                payload.push_svarint(*self as i32);
            }
        }
    )*};
}

unsigned_arg!(u8, u16, u32);
signed_arg!(i8, i16, i32);

impl LogArg for bool {
    fn encode<const N: usize>(&self, payload: &mut Payload<N>) {
        payload.push_varint(*self as u32);
    }
}

impl LogArg for &str {
    fn encode<const N: usize>(&self, payload: &mut Payload<N>) {
        payload.push_str(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_stable_and_distinct() {
        const A: u32 = token("batch mean=%d n=%u");
        assert_eq!(A, token("batch mean=%d n=%u"));
        assert_ne!(A, token("batch mean=%d n=%d"));
        // FNV-1a offset basis for the empty string.
        assert_eq!(token(""), 0x811C_9DC5);
    }

    #[test]
    fn payload_starts_with_little_endian_token() {
        let p = Payload::<16>::new(0xAABBCCDD);
        assert_eq!(p.as_bytes(), &[0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn varint_encodings_match_leb128() {
        let mut p = Payload::<16>::new(0);
        p.push_varint(0);
        p.push_varint(127);
        p.push_varint(300);
        p.push_varint(u32::MAX);
        assert_eq!(
            &p.as_bytes()[4..],
            &[0x00, 0x7F, 0xAC, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
    }

    #[test]
    fn svarint_is_zigzag() {
        let mut p = Payload::<16>::new(0);
        p.push_svarint(0);
        p.push_svarint(-1);
        p.push_svarint(1);
        p.push_svarint(-64);
        assert_eq!(&p.as_bytes()[4..], &[0x00, 0x01, 0x02, 0x7F]);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut p = Payload::<16>::new(0);
        p.push_str("main");
        assert_eq!(&p.as_bytes()[4..], b"\x04main");
    }

    #[test]
    fn overfull_argument_is_dropped_whole() {
        let mut p = Payload::<6>::new(0);
        p.push_varint(1); // fits: 5 bytes used
        p.push_varint(300); // needs 2, only 1 left: dropped entirely
        assert_eq!(p.len(), 5);
        p.push_varint(2); // still fits in the last byte
        assert_eq!(&p.as_bytes()[4..], &[0x01, 0x02]);
    }
}
