//! Unpacks returned words into a [`DecodedResult`] according to a fixed result shape.

use alloy::primitives::Address;

use super::codec::{bytes_to_utf8, uint_to_u64, word_bytes_to_uint};
use super::encoder::is_supported_shape;
use super::traits::{AbiValue, DecodedResult, Field, ParamKind, Word, WORD_SIZE};
use crate::error::{SocialError, SocialResult};

const ADDRESS_PADDING: usize = WORD_SIZE - 20;

pub fn decode_result(data: &[u8], shape: &[Field]) -> SocialResult<DecodedResult> {
    let kinds: Vec<ParamKind> = shape.iter().map(|f| f.kind).collect();
    if !is_supported_shape(&kinds) {
        return Err(SocialError::UnsupportedShape(format!(
            "result shape {:?} has more than one dynamic field",
            kinds
        )));
    }

    let head_len = shape.len() * WORD_SIZE;
    if data.len() < head_len {
        return Err(SocialError::Decoding(format!(
            "return data is {} bytes, shape needs at least {}",
            data.len(),
            head_len
        )));
    }

    let mut result = DecodedResult::default();
    for (index, field) in shape.iter().enumerate() {
        let word = word_at(data, index * WORD_SIZE)?;
        let value = match field.kind {
            ParamKind::Uint256 => AbiValue::Uint(word_bytes_to_uint(&word)),
            ParamKind::Address => AbiValue::Address(address_from_word(&word)?),
            ParamKind::String => {
                let offset = uint_to_u64(word_bytes_to_uint(&word))
                    .ok()
                    .and_then(|o| usize::try_from(o).ok())
                    .ok_or_else(|| {
                        SocialError::Decoding(format!("offset of `{}` is out of range", field.name))
                    })?;
                let bytes = read_dynamic_field(data, 0, offset)?;
                AbiValue::String(bytes_to_utf8(bytes))
            }
        };
        result.push(field.name, value);
    }

    Ok(result)
}

/// Reads the dynamic body that starts `offset` bytes after `base`: a length word, then exactly
/// that many bytes. Every range is checked against the buffer before it is sliced.
pub fn read_dynamic_field(data: &[u8], base: usize, offset: usize) -> SocialResult<&[u8]> {
    let start = base
        .checked_add(offset)
        .ok_or_else(|| SocialError::Decoding("dynamic offset overflows".to_string()))?;
    let length_word = word_at(data, start)?;

    let length = uint_to_u64(word_bytes_to_uint(&length_word))
        .ok()
        .and_then(|l| usize::try_from(l).ok())
        .ok_or_else(|| SocialError::Decoding("dynamic length is out of range".to_string()))?;

    let body_start = start + WORD_SIZE;
    let body_end = body_start
        .checked_add(length)
        .ok_or_else(|| SocialError::Decoding("dynamic length overflows".to_string()))?;
    if body_end > data.len() {
        return Err(SocialError::Decoding(format!(
            "dynamic field claims {} bytes at {}, buffer has {}",
            length,
            body_start,
            data.len()
        )));
    }

    Ok(&data[body_start..body_end])
}

fn word_at(data: &[u8], position: usize) -> SocialResult<Word> {
    let end = position
        .checked_add(WORD_SIZE)
        .ok_or_else(|| SocialError::Decoding("word position overflows".to_string()))?;
    data.get(position..end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            SocialError::Decoding(format!(
                "word at {} exceeds buffer of {} bytes",
                position,
                data.len()
            ))
        })
}

/// Identifiers sit in the low 20 bytes; the high 12 must be zero.
fn address_from_word(word: &Word) -> SocialResult<Address> {
    if word[..ADDRESS_PADDING].iter().any(|b| *b != 0) {
        return Err(SocialError::Decoding(format!(
            "identifier word 0x{} has non-zero padding",
            hex::encode(word)
        )));
    }
    Ok(Address::from_slice(&word[ADDRESS_PADDING..]))
}
