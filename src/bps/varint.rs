// BPS variable-length integer encoding.
//
// Little-endian groups of 7 bits. The final byte has bit 7 set; every
// continuation byte has it clear. After each continuation byte the
// remaining value is decremented by one, so no two encodings denote the
// same number (unlike plain LEB128):
//
//   0      -> 80
//   127    -> FF
//   128    -> 00 80
//   16511  -> 7F FF
//   16512  -> 00 00 80

use std::io;

/// Maximum encoded length for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` into `buf`, returning the number of bytes written (1..=10).
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let x = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = 0x80 | x;
            return i + 1;
        }
        buf[i] = x;
        i += 1;
        num -= 1;
    }
}

/// Append an encoded `u64` to a byte vector.
#[inline]
pub fn push_u64(out: &mut Vec<u8>, num: u64) {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    out.extend_from_slice(&buf[..len]);
}

/// Append an encoded `usize` to a byte vector.
#[inline]
pub fn push_usize(out: &mut Vec<u8>, num: usize) {
    push_u64(out, num as u64)
}

// ---------------------------------------------------------------------------
// Signed copy offsets
// ---------------------------------------------------------------------------

/// Sign-magnitude form of a relative copy offset: magnitude in the upper
/// bits, sign in bit 0. `+0` and `-0` both encode as 0.
#[inline]
pub fn encode_offset(delta: i64) -> u64 {
    (delta.unsigned_abs() << 1) | u64::from(delta < 0)
}

/// Inverse of [`encode_offset`].
#[inline]
pub fn decode_offset(raw: u64) -> i64 {
    let magnitude = (raw >> 1) as i64;
    if raw & 1 != 0 { -magnitude } else { magnitude }
}

// ---------------------------------------------------------------------------
// Decoding from byte slices
// ---------------------------------------------------------------------------

/// Decode a `u64` from the start of `data`.
/// Returns `(value, bytes_consumed)` or an error.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut val: u64 = 0;
    let mut shift: u64 = 1;
    for (i, &byte) in data.iter().enumerate() {
        let part = u64::from(byte & 0x7F)
            .checked_mul(shift)
            .ok_or(VarIntError::Overflow)?;
        val = val.checked_add(part).ok_or(VarIntError::Overflow)?;
        if byte & 0x80 != 0 {
            return Ok((val, i + 1));
        }
        shift = shift.checked_mul(1 << 7).ok_or(VarIntError::Overflow)?;
        val = val.checked_add(shift).ok_or(VarIntError::Overflow)?;
    }
    Err(VarIntError::Underflow)
}

/// Decode a `usize` from the start of `data`.
pub fn read_usize(data: &[u8]) -> Result<(usize, usize), VarIntError> {
    let (val, len) = read_u64(data)?;
    let val = usize::try_from(val).map_err(|_| VarIntError::Overflow)?;
    Ok((val, len))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Encoded byte-length of a `u64` value.
#[inline]
pub fn sizeof_u64(mut num: u64) -> usize {
    let mut len = 1;
    loop {
        num >>= 7;
        if num == 0 {
            return len;
        }
        num -= 1;
        len += 1;
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// Not enough input bytes to complete the integer.
    #[error("varint underflow (truncated input)")]
    Underflow,
    /// Value would overflow the target integer type.
    #[error("varint overflow")]
    Overflow,
}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
