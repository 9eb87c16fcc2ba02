//! QUIC variable-length integers (RFC 9000 Section 16)
//!
//! | 2MSB | Length  | Usable Bits | Range                  |
//! |------|---------|-------------|------------------------|
//! | 00   | 1 byte  | 6           | 0-63                   |
//! | 01   | 2 bytes | 14          | 0-16383                |
//! | 10   | 4 bytes | 30          | 0-1073741823           |
//! | 11   | 8 bytes | 62          | 0-4611686018427387903  |

use super::error::{Error, ParseOutcome, Result, WriteResult};
use bytes::{Buf, BufMut};

/// Largest value representable as a varint (2^62 - 1)
pub const MAX_VARINT: u64 = (1 << 62) - 1;

/// Widest varint encoding in bytes
pub const MAX_VARINT_SIZE: usize = 8;

const LENGTH_MASK: u8 = 0xC0;
const LENGTH_SHIFT: u8 = 6;
const VALUE_MASK: u8 = 0x3F;

/// Number of bytes needed to encode `value`, or `None` if it is out of range
pub fn varint_len(value: u64) -> Option<usize> {
    if value < 1 << 6 {
        Some(1)
    } else if value < 1 << 14 {
        Some(2)
    } else if value < 1 << 30 {
        Some(4)
    } else if value < 1 << 62 {
        Some(8)
    } else {
        None
    }
}

/// Like [`varint_len`], reporting an out-of-range value as an error
pub fn checked_varint_len(value: u64) -> Result<usize> {
    varint_len(value).ok_or(Error::VarintOutOfRange(value))
}

/// Encoded width announced by the first byte of a varint
pub fn width_from_first_byte(first: u8) -> usize {
    1 << ((first & LENGTH_MASK) >> LENGTH_SHIFT)
}

/// Encode `value` into `buf`
///
/// Nothing is written if the value is out of range or `buf` lacks space.
pub fn encode_varint<B: BufMut>(buf: &mut B, value: u64) -> WriteResult {
    let len = checked_varint_len(value)?;
    if buf.remaining_mut() < len {
        return Err(Error::BufferTooSmall {
            needed: len,
            available: buf.remaining_mut(),
        });
    }
    put_varint(buf, value);
    Ok(len)
}

/// Write a varint whose range and space were already checked
pub(crate) fn put_varint<B: BufMut>(buf: &mut B, value: u64) {
    match varint_len(value) {
        Some(1) => buf.put_u8(value as u8),
        Some(2) => buf.put_u16(value as u16 | 0x4000),
        Some(4) => buf.put_u32(value as u32 | 0x8000_0000),
        _ => {
            debug_assert!(value <= MAX_VARINT);
            buf.put_u64(value | 0xC000_0000_0000_0000)
        }
    }
}

/// Decode a varint from `buf`
///
/// Returns `Incomplete`, without consuming anything, when fewer bytes are
/// buffered than the first byte announces. Never returns `Malformed`:
/// every bit pattern is a valid varint.
pub fn decode_varint<B: Buf>(buf: &mut B) -> ParseOutcome<u64> {
    if !buf.has_remaining() {
        return ParseOutcome::Incomplete;
    }
    let first = buf.chunk()[0];
    let len = width_from_first_byte(first);
    if buf.remaining() < len {
        return ParseOutcome::Incomplete;
    }

    let value = match len {
        1 => u64::from(buf.get_u8() & VALUE_MASK),
        2 => u64::from(buf.get_u16() & 0x3FFF),
        4 => u64::from(buf.get_u32() & 0x3FFF_FFFF),
        _ => buf.get_u64() & MAX_VARINT,
    };
    ParseOutcome::Complete(value)
}
