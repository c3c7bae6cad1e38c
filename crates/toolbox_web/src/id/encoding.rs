//! Canonical text form of an [`Id`](super::Id): 20 characters of lowercase
//! base32hex, most significant bit first.
//!
//! The 96 id bits are followed by 4 zero padding bits so that they split into
//! exactly 20 groups of 5. The alphabet is in ASCII order, which makes the
//! string order of two encodings equal to the byte order of the ids.

use super::{ID_LEN, IdError};

/// Length of the canonical string encoding.
pub const ENCODED_LEN: usize = 20;

const ALPHABET: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
const PAD_BITS: u32 = 4;

pub(crate) fn encode(bytes: &[u8; ID_LEN]) -> String {
    let bits = to_u128(bytes) << PAD_BITS;
    let mut out = String::with_capacity(ENCODED_LEN);
    for i in 0..ENCODED_LEN {
        let shift = 5 * (ENCODED_LEN - 1 - i);
        let idx = ((bits >> shift) & 0x1f) as usize;
        out.push(ALPHABET[idx] as char);
    }
    out
}

pub(crate) fn decode(s: &str) -> Result<[u8; ID_LEN], IdError> {
    if s.len() != ENCODED_LEN {
        return Err(IdError::malformed(format!(
            "expected {ENCODED_LEN} characters, got {}",
            s.len()
        )));
    }

    let mut bits: u128 = 0;
    for (pos, c) in s.bytes().enumerate() {
        let value = digit(c).ok_or_else(|| {
            IdError::malformed(format!("invalid character {:?} at {pos}", c as char))
        })?;
        bits = (bits << 5) | u128::from(value);
    }

    if bits & ((1 << PAD_BITS) - 1) != 0 {
        return Err(IdError::malformed("non-zero padding bits"));
    }

    let raw = (bits >> PAD_BITS).to_be_bytes();
    let mut out = [0u8; ID_LEN];
    out.copy_from_slice(&raw[16 - ID_LEN..]);
    Ok(out)
}

fn to_u128(bytes: &[u8; ID_LEN]) -> u128 {
    let mut buf = [0u8; 16];
    buf[16 - ID_LEN..].copy_from_slice(bytes);
    u128::from_be_bytes(buf)
}

fn digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'v' => Some(c - b'a' + 10),
        _ => None,
    }
}
