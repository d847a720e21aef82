use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Request methods of the injected-provider protocol used by the client.
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const CALL: &str = "eth_call";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const GET_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// Failure reported by the provider, in the EIP-1193 `{code, message, data}` shape.
#[derive(Error, Debug, Clone, PartialEq, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ProviderError {
    /// The user denied the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method/account has not been authorised.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The chain is not known to the provider; it must be registered first.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// JSON-RPC internal error; also used for transport failures.
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// The wallet extension (or node) the client talks to. Implementations own the transport.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Issue one request; `params` is the JSON array the method expects.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Get a human-readable description of this provider
    fn description(&self) -> &str;
}
