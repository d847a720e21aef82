//! Packs typed arguments into selector ‖ head ‖ tail calldata.
//!
//! The head holds one word per argument: static values in place, dynamic values as an offset
//! (measured from the start of the argument area) into the tail. The tail holds each dynamic
//! body as a length word followed by the bytes right-padded to a word boundary.

use alloy::primitives::U256;
use tracing::debug;

use super::codec::{uint_to_word, utf8_to_bytes};
use super::traits::{AbiValue, EncodedCall, ParamKind, Word, WORD_SIZE};
use crate::contracts::abi::MethodSpec;
use crate::error::{SocialError, SocialResult};

/// Width of an identifier inside its word.
const ADDRESS_BITS: usize = 160;

pub fn encode_call(method: &MethodSpec, args: &[AbiValue]) -> SocialResult<EncodedCall> {
    check_arguments(method, args)?;

    let head_len = args.len() * WORD_SIZE;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            AbiValue::Uint(value) => head.extend_from_slice(&uint_to_word(*value, 256)?),
            AbiValue::Address(address) => head.extend_from_slice(&address_word(address)),
            AbiValue::String(text) => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(&uint_to_word(offset, 256)?);
                tail.extend_from_slice(&encode_dynamic_body(&utf8_to_bytes(text))?);
            }
        }
    }

    let mut calldata = Vec::with_capacity(4 + head.len() + tail.len());
    calldata.extend_from_slice(&method.selector);
    calldata.extend_from_slice(&head);
    calldata.extend_from_slice(&tail);

    debug!(
        "🔧 Encoded {}: {} bytes, selector 0x{}",
        method.signature,
        calldata.len(),
        hex::encode(method.selector)
    );

    Ok(EncodedCall::new(calldata))
}

/// Length word followed by `bytes` zero-padded up to the next word boundary.
pub fn encode_dynamic_body(bytes: &[u8]) -> SocialResult<Vec<u8>> {
    let padded_len = padded_len(bytes.len());
    let mut body = Vec::with_capacity(WORD_SIZE + padded_len);
    body.extend_from_slice(&uint_to_word(U256::from(bytes.len()), 256)?);
    body.extend_from_slice(bytes);
    body.resize(WORD_SIZE + padded_len, 0);
    Ok(body)
}

/// Smallest multiple of the word size that holds `len` bytes.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}

fn address_word(address: &alloy::primitives::Address) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - ADDRESS_BITS / 8..].copy_from_slice(address.as_slice());
    word
}

fn check_arguments(method: &MethodSpec, args: &[AbiValue]) -> SocialResult<()> {
    let dynamic = method.arguments.iter().filter(|k| k.is_dynamic()).count();
    if dynamic > 1 {
        return Err(SocialError::UnsupportedShape(format!(
            "{} has {} dynamic arguments; at most one is supported",
            method.signature, dynamic
        )));
    }

    if args.len() != method.arguments.len() {
        return Err(SocialError::Encoding(format!(
            "{} takes {} argument(s), got {}",
            method.signature,
            method.arguments.len(),
            args.len()
        )));
    }

    for (position, (expected, arg)) in method.arguments.iter().zip(args).enumerate() {
        if arg.kind() != *expected {
            return Err(SocialError::Encoding(format!(
                "{} argument {} must be {}, got {}",
                method.signature,
                position,
                expected.type_name(),
                arg.kind().type_name()
            )));
        }
    }

    Ok(())
}

/// Shapes the codec guarantees: at most one dynamic argument.
pub fn is_supported_shape(kinds: &[ParamKind]) -> bool {
    kinds.iter().filter(|k| k.is_dynamic()).count() <= 1
}
