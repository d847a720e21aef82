use alloy::primitives::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::info;

use crate::contracts::encoding::codec::hex_to_chain_id;
use crate::error::{SocialError, SocialResult};

const DEPLOY_HINT: &str = "run `python scripts/deploy.py` to deploy the contract and write static/contract.json";

/// Deployed contract the session talks to. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDescriptor {
    pub address: Address,
    pub abi: Value,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    address: String,
    #[serde(default)]
    abi: Value,
    #[serde(rename = "chainId")]
    chain_id: Value,
}

impl ContractDescriptor {
    /// Load from a file path, or fetch when `source` is an `http(s)://` URL.
    pub async fn load(source: &str) -> SocialResult<Self> {
        info!("📄 Loading contract descriptor from {}", source);

        let body = if source.starts_with("http://") || source.starts_with("https://") {
            let response = reqwest::get(source)
                .await
                .map_err(|e| setup_error(source, &e.to_string()))?;
            if !response.status().is_success() {
                return Err(setup_error(source, &format!("HTTP {}", response.status())));
            }
            response
                .text()
                .await
                .map_err(|e| setup_error(source, &e.to_string()))?
        } else {
            tokio::fs::read_to_string(source)
                .await
                .map_err(|e| setup_error(source, &e.to_string()))?
        };

        let descriptor = Self::from_json(&body).map_err(|e| setup_error(source, &e.to_string()))?;
        info!(
            "✅ Contract {} on chain {}",
            descriptor.address.to_checksum(None),
            descriptor.chain_id
        );
        Ok(descriptor)
    }

    pub fn from_json(body: &str) -> SocialResult<Self> {
        let raw: RawDescriptor = serde_json::from_str(body)
            .map_err(|e| SocialError::Setup(format!("malformed descriptor: {}", e)))?;

        let address = Address::from_str(raw.address.trim())
            .map_err(|e| SocialError::Setup(format!("invalid contract address {}: {}", raw.address, e)))?;

        let chain_id = match &raw.chain_id {
            Value::Number(n) => n.as_u64(),
            Value::String(s) if s.starts_with("0x") => hex_to_chain_id(s).ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .filter(|id| *id > 0)
        .ok_or_else(|| SocialError::Setup(format!("chainId must be a positive integer, got {}", raw.chain_id)))?;

        Ok(Self {
            address,
            abi: raw.abi,
            chain_id,
        })
    }

    /// The `{address, abi, chainId}` document, as served to browsers.
    pub fn to_json(&self) -> Value {
        json!({
            "address": self.address.to_checksum(None),
            "abi": self.abi,
            "chainId": self.chain_id,
        })
    }
}

fn setup_error(source: &str, cause: &str) -> SocialError {
    SocialError::Setup(format!("contract descriptor {} unavailable ({}); {}", source, cause, DEPLOY_HINT))
}
