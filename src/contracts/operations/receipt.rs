use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::contracts::encoding::codec::{uint_to_u64, word_to_uint};
use crate::contracts::execution::methods;
use crate::contracts::operations::session::Session;
use crate::error::{SocialError, SocialResult};

/// How often to ask for a receipt, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&PollingConfig> for ReceiptPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

/// Submitted, not yet observed in a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub transaction_hash: String,
    pub submitted_at: DateTime<Utc>,
}

impl PendingTransaction {
    pub fn new(transaction_hash: impl Into<String>) -> Self {
        Self {
            transaction_hash: transaction_hash.into(),
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    /// `0x1` success, `0x0` revert. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }

    pub fn block(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|n| word_to_uint(n).and_then(uint_to_u64).ok())
    }
}

/// Polls until the provider returns a receipt. Ends early on `cancel` or after `policy.timeout`.
/// A reverted receipt is an error.
pub async fn wait_for_receipt(
    session: &Session,
    pending: &PendingTransaction,
    policy: &ReceiptPolicy,
    cancel: &CancellationToken,
) -> SocialResult<TransactionReceipt> {
    let hash = pending.transaction_hash.as_str();
    info!("⏳ Waiting for receipt of {}", hash);

    let receipt = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("🛑 Stopped waiting for {}", hash);
            return Err(SocialError::Cancelled(hash.to_string()));
        }
        polled = tokio::time::timeout(policy.timeout, poll_receipt(session, hash, policy.interval)) => {
            match polled {
                Ok(result) => result?,
                Err(_) => {
                    warn!("⌛ No receipt for {} after {:?}", hash, policy.timeout);
                    return Err(SocialError::ReceiptTimeout {
                        tx_hash: hash.to_string(),
                        waited: policy.timeout,
                    });
                }
            }
        }
    };

    let elapsed = Utc::now() - pending.submitted_at;
    if !receipt.succeeded() {
        warn!("❌ {} reverted in block {:?}", hash, receipt.block());
        return Err(SocialError::Reverted(hash.to_string()));
    }
    info!(
        "✅ {} mined in block {:?} after {}ms",
        hash,
        receipt.block(),
        elapsed.num_milliseconds()
    );
    Ok(receipt)
}

async fn poll_receipt(
    session: &Session,
    hash: &str,
    interval: Duration,
) -> SocialResult<TransactionReceipt> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let value = session.request(methods::GET_RECEIPT, json!([hash])).await?;
        if !value.is_null() {
            return serde_json::from_value(value)
                .map_err(|e| SocialError::Decoding(format!("malformed receipt for {}: {}", hash, e)));
        }
        debug!("⏳ {} not mined yet (poll {})", hash, attempt);
        tokio::time::sleep(interval).await;
    }
}
