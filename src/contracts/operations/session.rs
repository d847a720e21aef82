use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::contracts::encoding::codec::chain_id_to_hex;
use crate::contracts::execution::{methods, WalletProvider};
use crate::contracts::operations::network::{ensure_chain, ChainRegistration};
use crate::error::{SocialError, SocialResult};
use crate::models::ContractDescriptor;

/// Connected wallet + loaded contract. Every provider request goes through [`Session::request`],
/// which issues them one at a time.
pub struct Session {
    id: Uuid,
    provider: Arc<dyn WalletProvider>,
    descriptor: ContractDescriptor,
    account: String,
    chain_id: u64,
    request_lock: Mutex<()>,
}

impl Session {
    /// Request accounts, bring the wallet onto the descriptor's chain and bind the first account
    /// as signer.
    pub async fn connect(
        provider: Option<Arc<dyn WalletProvider>>,
        descriptor: ContractDescriptor,
        registration: &ChainRegistration,
    ) -> SocialResult<Self> {
        let provider = provider.ok_or_else(|| {
            SocialError::ProviderUnavailable("no wallet provider configured".to_string())
        })?;
        info!("🔌 Connecting through {}", provider.description());

        let mut session = Self::detached(provider, descriptor);

        let accounts = session.request(methods::REQUEST_ACCOUNTS, json!([])).await?;
        session.account = accounts
            .as_array()
            .and_then(|list| list.first())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SocialError::UserRejected("wallet returned no accounts".to_string()))?;

        let expected = session.descriptor.chain_id;
        let chain_id = ensure_chain(&session, expected, registration).await?;
        session.chain_id = chain_id;

        info!("✅ {}", session.banner());
        Ok(session)
    }

    /// A session that has not requested accounts or checked the chain yet.
    pub(crate) fn detached(provider: Arc<dyn WalletProvider>, descriptor: ContractDescriptor) -> Self {
        let chain_id = descriptor.chain_id;
        Self {
            id: Uuid::new_v4(),
            provider,
            descriptor,
            account: String::new(),
            chain_id,
            request_lock: Mutex::new(()),
        }
    }

    pub async fn request(&self, method: &str, params: Value) -> SocialResult<Value> {
        let _serialized = self.request_lock.lock().await;
        debug!("➡️ [{}] {} {}", self.id, method, params);
        self.provider
            .request(method, params)
            .await
            .map_err(|e| SocialError::from_provider(method, e))
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    #[cfg(test)]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    /// `Connected: <account> | chainId=<n> (<0xhex>)`
    pub fn banner(&self) -> String {
        format!(
            "Connected: {} | chainId={} ({})",
            self.account,
            self.chain_id,
            chain_id_to_hex(self.chain_id)
        )
    }
}
