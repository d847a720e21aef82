//! Error kinds for the codec, dispatch table and call orchestration.

use std::time::Duration;
use thiserror::Error;

use crate::contracts::execution::ProviderError;

/// Everything that can go wrong between a user action and a settled transaction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SocialError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("request rejected by user: {0}")]
    UserRejected(String),

    #[error("wrong network: expected chain {expected}, connected to {actual} ({reason})")]
    ChainMismatch {
        expected: u64,
        actual: u64,
        reason: String,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("{method} failed with code {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error("no receipt for {tx_hash} after {waited:?}")]
    ReceiptTimeout { tx_hash: String, waited: Duration },

    #[error("cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("another transaction is still pending")]
    OperationInFlight,

    #[error("wallet not connected")]
    NotConnected,
}

pub type SocialResult<T> = Result<T, SocialError>;

impl SocialError {
    /// Classify a provider failure for the request `method`.
    pub fn from_provider(method: &str, err: ProviderError) -> Self {
        if err.code == ProviderError::USER_REJECTED || err.code == ProviderError::UNAUTHORIZED {
            SocialError::UserRejected(err.message)
        } else {
            SocialError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            }
        }
    }
}
