use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::NetworkConfig;
use crate::contracts::encoding::codec::{chain_id_to_hex, hex_to_chain_id};
use crate::contracts::execution::{methods, ProviderError};
use crate::contracts::operations::session::Session;
use crate::error::{SocialError, SocialResult};

/// What the wallet is told when it has never seen the target chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRegistration {
    pub chain_name_prefix: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub rpc_urls: Vec<String>,
}

impl ChainRegistration {
    /// `wallet_addEthereumChain` parameter object for `chain_id`.
    pub fn params(&self, chain_id: u64) -> Value {
        json!({
            "chainId": chain_id_to_hex(chain_id),
            "chainName": format!("{} {}", self.chain_name_prefix, chain_id),
            "nativeCurrency": {
                "name": self.currency_name,
                "symbol": self.currency_symbol,
                "decimals": self.currency_decimals,
            },
            "rpcUrls": self.rpc_urls,
        })
    }
}

impl From<&NetworkConfig> for ChainRegistration {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            chain_name_prefix: config.chain_name_prefix.clone(),
            currency_name: config.currency_name.clone(),
            currency_symbol: config.currency_symbol.clone(),
            currency_decimals: config.currency_decimals,
            rpc_urls: config.rpc_urls.clone(),
        }
    }
}

impl Default for ChainRegistration {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

pub async fn read_chain_id(session: &Session) -> SocialResult<u64> {
    let value = session.request(methods::CHAIN_ID, json!([])).await?;
    let text = value.as_str().ok_or_else(|| {
        SocialError::Decoding(format!("eth_chainId returned {} instead of a hex string", value))
    })?;
    hex_to_chain_id(text)
}

/// Brings the wallet onto `expected`: one switch request, and one registration request if the
/// wallet does not know the chain. Returns the chain id read back afterwards.
pub async fn ensure_chain(
    session: &Session,
    expected: u64,
    registration: &ChainRegistration,
) -> SocialResult<u64> {
    let current = read_chain_id(session).await?;
    if current == expected {
        return Ok(current);
    }

    warn!(
        "⚠️ Wallet is on chain {} ({}), contract lives on {} ({})",
        current,
        chain_id_to_hex(current),
        expected,
        chain_id_to_hex(expected)
    );

    let switch = session
        .request(
            methods::SWITCH_CHAIN,
            json!([{ "chainId": chain_id_to_hex(expected) }]),
        )
        .await;

    match switch {
        Ok(_) => info!("🔀 Switched wallet to chain {}", expected),
        Err(SocialError::Rpc { code, .. }) if code == ProviderError::UNRECOGNIZED_CHAIN => {
            info!("➕ Chain {} unknown to wallet, registering it", expected);
            register_chain(session, expected, current, registration).await?;
        }
        Err(SocialError::UserRejected(message)) => return Err(SocialError::UserRejected(message)),
        Err(other) => {
            return Err(SocialError::ChainMismatch {
                expected,
                actual: current,
                reason: format!("switch failed: {}", other),
            })
        }
    }

    let actual = read_chain_id(session).await?;
    if actual != expected {
        return Err(SocialError::ChainMismatch {
            expected,
            actual,
            reason: "wallet is still on another chain".to_string(),
        });
    }
    Ok(actual)
}

async fn register_chain(
    session: &Session,
    chain_id: u64,
    current: u64,
    registration: &ChainRegistration,
) -> SocialResult<()> {
    match session
        .request(methods::ADD_CHAIN, json!([registration.params(chain_id)]))
        .await
    {
        Ok(_) => Ok(()),
        Err(SocialError::UserRejected(message)) => Err(SocialError::UserRejected(message)),
        Err(other) => Err(SocialError::ChainMismatch {
            expected: chain_id,
            actual: current,
            reason: format!("registration failed: {}", other),
        }),
    }
}
