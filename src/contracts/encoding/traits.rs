use alloy::primitives::{Address, U256};

use crate::error::{SocialError, SocialResult};

/// Width of one calling-convention word.
pub const WORD_SIZE: usize = 32;

/// One 32-byte calling-convention word.
pub type Word = [u8; WORD_SIZE];

/// Primitive kinds the codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Uint256,
    Address,
    String,
}

impl ParamKind {
    /// Dynamic kinds live in the tail and are referenced by an offset word.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ParamKind::String)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Uint256 => "uint256",
            ParamKind::Address => "address",
            ParamKind::String => "string",
        }
    }
}

/// A named slot in a result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind }
    }
}

/// A typed argument or decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Address(Address),
    String(String),
}

impl AbiValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            AbiValue::Uint(_) => ParamKind::Uint256,
            AbiValue::Address(_) => ParamKind::Address,
            AbiValue::String(_) => ParamKind::String,
        }
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

/// selector ‖ encoded arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall(Vec<u8>);

impl EncodedCall {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.0.get(..4).and_then(|s| s.try_into().ok())
    }

    /// `0x`-prefixed hex, the form the provider's `data` field expects.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

/// Field name → typed value, in result-shape order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedResult {
    fields: Vec<(&'static str, AbiValue)>,
}

impl DecodedResult {
    pub fn push(&mut self, name: &'static str, value: AbiValue) {
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn uint(&self, name: &str) -> SocialResult<U256> {
        match self.get(name) {
            Some(AbiValue::Uint(v)) => Ok(*v),
            other => Err(Self::mismatch(name, "uint256", other)),
        }
    }

    pub fn address(&self, name: &str) -> SocialResult<Address> {
        match self.get(name) {
            Some(AbiValue::Address(v)) => Ok(*v),
            other => Err(Self::mismatch(name, "address", other)),
        }
    }

    pub fn string(&self, name: &str) -> SocialResult<&str> {
        match self.get(name) {
            Some(AbiValue::String(v)) => Ok(v.as_str()),
            other => Err(Self::mismatch(name, "string", other)),
        }
    }

    fn mismatch(name: &str, expected: &str, found: Option<&AbiValue>) -> SocialError {
        match found {
            Some(value) => SocialError::Decoding(format!(
                "field `{}` is {}, expected {}",
                name,
                value.kind().type_name(),
                expected
            )),
            None => SocialError::Decoding(format!("field `{}` missing from result", name)),
        }
    }
}
