use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::contracts::execution::traits::{methods, ProviderError, WalletProvider};

const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

/// JSON-RPC 2.0 over HTTP against a node with unlocked accounts.
///
/// Stands in for a wallet extension: `eth_requestAccounts` is answered from the configured
/// account or the node's `eth_accounts`, everything else is forwarded verbatim.
pub struct HttpProvider {
    client: Client,
    rpc_url: String,
    account: Option<String>,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        info!("🔧 Initializing HttpProvider");
        info!("  RPC URL: {}", config.rpc_url);
        info!("  Account override: {:?}", config.account);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                ProviderError::new(ProviderError::INTERNAL, format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            account: config.account.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    fn build_request<'a>(&self, method: &'a str, params: Value) -> RpcRequest<'a> {
        RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        }
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request = self.build_request(method, params);
        debug!("📡 JSON-RPC #{} {}", request.id, method);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(ProviderError::INTERNAL, format!("Failed to reach {}: {}", self.rpc_url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::new(
                ProviderError::INTERNAL,
                format!("{} returned HTTP {}: {}", method, status, body),
            ));
        }

        let body: RpcResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderError::INTERNAL, format!("Failed to parse {} response: {}", method, e))
        })?;

        match (body.error, body.result) {
            (Some(error), _) => {
                warn!("❌ {} failed: {}", method, error);
                Err(wallet_error(error))
            }
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}

/// Nodes answer `wallet_*` calls with "method not found"; wallets report that as 4200.
fn wallet_error(error: ProviderError) -> ProviderError {
    if error.code == METHOD_NOT_FOUND {
        ProviderError {
            code: ProviderError::UNSUPPORTED_METHOD,
            ..error
        }
    } else {
        error
    }
}

#[async_trait]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        if method == methods::REQUEST_ACCOUNTS {
            if let Some(account) = &self.account {
                return Ok(json!([account]));
            }
            return self.send(methods::ACCOUNTS, json!([])).await;
        }
        self.send(method, params).await
    }

    fn description(&self) -> &str {
        "HttpProvider: JSON-RPC over HTTP against a node with unlocked accounts"
    }
}
