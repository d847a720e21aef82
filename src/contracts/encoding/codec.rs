//! Primitive conversions between bytes, hex text, unsigned integers and UTF-8.

use alloy::primitives::U256;

use super::traits::{Word, WORD_SIZE};
use crate::error::{SocialError, SocialResult};

/// `0x`-prefixed lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Accepts an optional `0x` prefix. `"0x"` is the empty byte string.
pub fn hex_to_bytes(text: &str) -> SocialResult<Vec<u8>> {
    let digits = strip_prefix(text);
    if digits.len() % 2 != 0 {
        return Err(SocialError::Decoding(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }
    hex::decode(digits).map_err(|e| SocialError::Decoding(format!("invalid hex: {}", e)))
}

/// Big-endian, left-zero-padded to one 32-byte word.
///
/// `word_bits` narrows the accepted range (e.g. 160 for identifiers); values that do not fit
/// fail with [`SocialError::Encoding`].
pub fn uint_to_word(value: U256, word_bits: usize) -> SocialResult<Word> {
    if word_bits == 0 || word_bits > 256 {
        return Err(SocialError::Encoding(format!(
            "word width must be 1..=256 bits, got {}",
            word_bits
        )));
    }
    if value.bit_len() > word_bits {
        return Err(SocialError::Encoding(format!(
            "{} does not fit in {} bits",
            value, word_bits
        )));
    }
    Ok(value.to_be_bytes::<WORD_SIZE>())
}

/// Parses a decimal or `0x`-hex integer literal and packs it into a word.
///
/// Negative literals and values above 2^256−1 fail with [`SocialError::Encoding`].
pub fn uint_literal_to_word(literal: &str) -> SocialResult<Word> {
    let trimmed = literal.trim();
    if trimmed.starts_with('-') {
        return Err(SocialError::Encoding(format!(
            "negative value {} cannot be encoded as uint256",
            trimmed
        )));
    }

    let value = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        U256::from_str_radix(&trimmed[2..], 16)
    } else {
        U256::from_str_radix(trimmed, 10)
    }
    .map_err(|e| SocialError::Encoding(format!("`{}` is not a uint256: {}", trimmed, e)))?;

    uint_to_word(value, 256)
}

/// Any-length hex text (prefix optional) to an unsigned integer.
pub fn word_to_uint(text: &str) -> SocialResult<U256> {
    let digits = strip_prefix(text);
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(SocialError::Decoding(format!(
            "non-hex character `{}` in `{}`",
            bad, text
        )));
    }
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| SocialError::Decoding(format!("`{}` exceeds 256 bits: {}", text, e)))
}

pub fn word_bytes_to_uint(word: &Word) -> U256 {
    U256::from_be_bytes(*word)
}

/// Narrows a decoded integer to `u64`.
pub fn uint_to_u64(value: U256) -> SocialResult<u64> {
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|limb| *limb != 0) {
        return Err(SocialError::Decoding(format!("{} does not fit in 64 bits", value)));
    }
    Ok(limbs[0])
}

/// Lossy: invalid sequences become U+FFFD instead of failing.
pub fn bytes_to_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub fn utf8_to_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// The provider protocol wants chain ids as `0x`-prefixed hex everywhere.
pub fn chain_id_to_hex(chain_id: u64) -> String {
    format!("0x{:x}", chain_id)
}

pub fn hex_to_chain_id(text: &str) -> SocialResult<u64> {
    uint_to_u64(word_to_uint(text)?)
}

fn strip_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}
