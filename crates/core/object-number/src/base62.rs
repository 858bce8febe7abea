//! Base62 integer codec.
//!
//! Every digit group of an object number is a base62 rendering of a non-negative integer
//! using the alphabet `0-9a-zA-Z`, most-significant digit first. The codec itself never pads;
//! fixed-width fields are left-padded with `'0'` by [`encode_padded`].

/// The 62-symbol alphabet, in digit order.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The radix of the codec.
pub const BASE: u64 = 62;

/// Encode `num` as a base62 string with no leading padding.
///
/// `encode(0)` is `"0"`.
pub fn encode(mut num: u64) -> String {
    if num == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::new();
    while num > 0 {
        digits.push(ALPHABET[(num % BASE) as usize]);
        num /= BASE;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Encode `num` and left-pad the result with `'0'` up to `width` characters.
///
/// Values wider than `width` are returned unpadded; callers bound their values at
/// construction time so this never happens for a valid object number.
pub fn encode_padded(num: u64, width: usize) -> String {
    format!("{:0>width$}", encode(num))
}

/// Decode a base62 string back into an integer.
pub fn decode(s: &str) -> Result<u64, DecodeError> {
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }

    s.chars().try_fold(0u64, |acc, c| {
        let digit = digit_value(c).ok_or_else(|| DecodeError::InvalidCharacter {
            character: c,
            value: s.to_string(),
        })?;
        acc.checked_mul(BASE)
            .and_then(|acc| acc.checked_add(digit))
            .ok_or_else(|| DecodeError::Overflow {
                value: s.to_string(),
            })
    })
}

/// Capacity of a field `width` digits wide, i.e. `62^width`.
pub const fn capacity(width: u32) -> u64 {
    BASE.pow(width)
}

fn digit_value(c: char) -> Option<u64> {
    match c {
        '0'..='9' => Some(c as u64 - '0' as u64),
        'a'..='z' => Some(c as u64 - 'a' as u64 + 10),
        'A'..='Z' => Some(c as u64 - 'A' as u64 + 36),
        _ => None,
    }
}

/// Error type for [`decode`] failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Nothing to decode
    #[error("cannot decode an empty base62 string")]
    Empty,

    /// A character outside of `0-9a-zA-Z`
    #[error("invalid base62 character '{character}' in '{value}'")]
    InvalidCharacter { character: char, value: String },

    /// The decoded value does not fit in 64 bits
    #[error("base62 value '{value}' overflows a 64-bit integer")]
    Overflow { value: String },
}
