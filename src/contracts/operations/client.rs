use serde_json::json;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::contracts::abi::{MethodKind, MethodTable};
use crate::contracts::encoding::codec::{bytes_to_hex, hex_to_bytes, uint_to_u64};
use crate::contracts::encoding::{decode_result, encode_call, AbiValue, DecodedResult};
use crate::contracts::execution::methods;
use crate::contracts::operations::receipt::{
    wait_for_receipt, PendingTransaction, ReceiptPolicy, TransactionReceipt,
};
use crate::contracts::operations::session::Session;
use crate::error::{SocialError, SocialResult};
use crate::models::Post;

/// Typed operations over the microblog contract, one per dispatch-table entry.
pub struct SocialClient {
    session: Arc<Session>,
    methods: MethodTable,
    policy: ReceiptPolicy,
    in_flight: watch::Sender<bool>,
    cancel_token: Mutex<CancellationToken>,
}

/// Holds the in-flight flag for the duration of one write.
struct InFlightGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

impl SocialClient {
    pub fn new(session: Arc<Session>, policy: ReceiptPolicy) -> Self {
        let (in_flight, _) = watch::channel(false);
        Self {
            session,
            methods: MethodTable::new(),
            policy,
            in_flight,
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// `eth_call` against the latest block, decoded per the method's result shape.
    pub async fn call(&self, name: &str, args: &[AbiValue]) -> SocialResult<DecodedResult> {
        let method = self.methods.get(name)?;
        if method.kind != MethodKind::Read {
            return Err(SocialError::UnknownMethod(format!("{} is not a read method", name)));
        }

        let calldata = encode_call(method, args)?;
        let params = json!([
            {
                "to": self.contract_address(),
                "data": calldata.to_hex(),
            },
            "latest"
        ]);
        let returned = self.session.request(methods::CALL, params).await?;
        let text = returned.as_str().ok_or_else(|| {
            SocialError::Decoding(format!("{} returned {} instead of hex data", name, returned))
        })?;

        decode_result(&hex_to_bytes(text)?, method.results)
    }

    /// Sign and submit a write, then wait for its receipt. `on_submitted` runs once the
    /// transaction hash is known. Fails with [`SocialError::OperationInFlight`] while another
    /// write is pending.
    pub async fn transact<F>(
        &self,
        name: &str,
        args: &[AbiValue],
        on_submitted: F,
    ) -> SocialResult<TransactionReceipt>
    where
        F: FnOnce(&PendingTransaction) + Send,
    {
        let method = self.methods.get(name)?;
        if method.kind != MethodKind::Write {
            return Err(SocialError::UnknownMethod(format!("{} is not a write method", name)));
        }
        let calldata = encode_call(method, args)?;

        // Same lock as `cancel_pending`: any cancel after `in_flight` flips reaches this token,
        // including one issued while the wallet is still signing.
        let (token, _guard) = {
            let current = self.cancel_token.lock().await;
            let guard = self.begin_write()?;
            (current.clone(), guard)
        };

        info!("🚀 Sending {} from {}", method.signature, self.session.account());
        let params = json!([{
            "from": self.session.account(),
            "to": self.contract_address(),
            "data": calldata.to_hex(),
        }]);
        let hash = self.session.request(methods::SEND_TRANSACTION, params).await?;
        let hash = hash.as_str().ok_or_else(|| {
            SocialError::Decoding(format!("{} returned {} instead of a transaction hash", name, hash))
        })?;

        let pending = PendingTransaction::new(hash);
        on_submitted(&pending);

        if token.is_cancelled() {
            warn!("🛑 Cancelled before the receipt wait for {}", pending.transaction_hash);
            return Err(SocialError::Cancelled(pending.transaction_hash));
        }
        wait_for_receipt(&self.session, &pending, &self.policy, &token).await
    }

    pub async fn get_posts_count(&self) -> SocialResult<u64> {
        let decoded = self.call("getPostsCount", &[]).await?;
        uint_to_u64(decoded.uint("count")?)
    }

    pub async fn get_post(&self, id: u64) -> SocialResult<Post> {
        let decoded = self.call("getPost", &[id.into()]).await?;
        Post::from_decoded(id, &decoded)
    }

    pub async fn create_post<F>(&self, content: &str, on_submitted: F) -> SocialResult<TransactionReceipt>
    where
        F: FnOnce(&PendingTransaction) + Send,
    {
        self.transact("createPost", &[content.into()], on_submitted).await
    }

    pub async fn like_post<F>(&self, id: u64, on_submitted: F) -> SocialResult<TransactionReceipt>
    where
        F: FnOnce(&PendingTransaction) + Send,
    {
        self.transact("likePost", &[id.into()], on_submitted).await
    }

    pub fn in_flight(&self) -> bool {
        *self.in_flight.borrow()
    }

    pub fn subscribe_in_flight(&self) -> watch::Receiver<bool> {
        self.in_flight.subscribe()
    }

    /// Abandon the current receipt wait. Later writes get a fresh token.
    pub async fn cancel_pending(&self) {
        let mut token = self.cancel_token.lock().await;
        if self.in_flight() {
            warn!("🛑 Cancelling pending receipt wait");
        }
        token.cancel();
        *token = CancellationToken::new();
    }

    fn begin_write(&self) -> SocialResult<InFlightGuard<'_>> {
        let acquired = self.in_flight.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        if !acquired {
            warn!("⏸️ Write rejected: another transaction is pending");
            return Err(SocialError::OperationInFlight);
        }
        Ok(InFlightGuard {
            flag: &self.in_flight,
        })
    }

    fn contract_address(&self) -> String {
        bytes_to_hex(self.session.descriptor().address.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::execution::mock::{MockWallet, TEST_ACCOUNT};
    use crate::contracts::execution::{ProviderError, WalletProvider};
    use crate::contracts::operations::network::ChainRegistration;
    use crate::models::ContractDescriptor;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn fast_policy() -> ReceiptPolicy {
        ReceiptPolicy {
            interval: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        }
    }

    async fn client_for(wallet: MockWallet) -> (Arc<MockWallet>, Arc<SocialClient>) {
        let wallet = Arc::new(wallet);
        let provider: Arc<dyn WalletProvider> = wallet.clone();
        let descriptor = ContractDescriptor::from_json(
            r#"{"address": "0x5FbDB2315678afecb367f032d93F642f64180aa3", "chainId": 31337}"#,
        )
        .unwrap();
        let session = Session::connect(Some(provider), descriptor, &ChainRegistration::default())
            .await
            .unwrap();
        (wallet, Arc::new(SocialClient::new(Arc::new(session), fast_policy())))
    }

    #[tokio::test]
    async fn test_reads_count_and_posts() {
        let (wallet, client) = client_for(MockWallet::new(31337).with_numbered_posts(3)).await;

        assert_eq!(assert_ok!(client.get_posts_count().await), 3);
        let post = assert_ok!(client.get_post(2).await);
        assert_eq!(post.id, 2);
        assert_eq!(post.content, "post #2");
        assert_eq!(post.author.to_checksum(None), TEST_ACCOUNT);

        let (_, params) = wallet
            .requests()
            .into_iter()
            .find(|(m, _)| m == methods::CALL)
            .unwrap();
        assert_eq!(params[0]["to"], "0x5fbdb2315678afecb367f032d93f642f64180aa3");
        assert_eq!(params[0]["data"], "0x83624882");
        assert_eq!(params[1], "latest");
    }

    #[tokio::test]
    async fn test_create_post_sends_reference_calldata() {
        let (wallet, client) = client_for(MockWallet::new(31337)).await;
        let mut seen = None;
        let receipt = assert_ok!(client.create_post("hi", |p| seen = Some(p.clone())).await);

        let pending = seen.unwrap();
        assert_eq!(receipt.transaction_hash, pending.transaction_hash);
        assert!(!client.in_flight());

        let (_, params) = wallet
            .requests()
            .into_iter()
            .find(|(m, _)| m == methods::SEND_TRANSACTION)
            .unwrap();
        assert_eq!(params[0]["from"], TEST_ACCOUNT);
        assert_eq!(
            params[0]["data"],
            concat!(
                "0xc7303c61",
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000002",
                "6869000000000000000000000000000000000000000000000000000000000000",
            )
        );
        assert_eq!(wallet.posts().len(), 1);
        assert_eq!(wallet.posts()[0].content, "hi");
    }

    #[tokio::test]
    async fn test_like_post_increments_likes() {
        let (wallet, client) = client_for(MockWallet::new(31337).with_numbered_posts(2)).await;
        let before = wallet.posts()[1].likes;
        assert_ok!(client.like_post(1, |_| {}).await);
        assert_eq!(wallet.posts()[1].likes, before + 1);
        assert_eq!(assert_ok!(client.get_post(1).await).likes, before + 1);
    }

    #[tokio::test]
    async fn test_second_write_while_pending_is_rejected() {
        let (wallet, client) =
            client_for(MockWallet::new(31337).with_polls_before_receipt(10)).await;
        let mut in_flight = client.subscribe_in_flight();

        let first = {
            let client = client.clone();
            tokio::spawn(async move { client.create_post("first", |_| {}).await })
        };
        in_flight.wait_for(|busy| *busy).await.unwrap();

        let second = client.create_post("second", |_| {}).await;
        assert_eq!(second.unwrap_err(), SocialError::OperationInFlight);
        let like = client.like_post(0, |_| {}).await;
        assert_eq!(like.unwrap_err(), SocialError::OperationInFlight);

        assert_ok!(first.await.unwrap());
        assert!(!client.in_flight());
        assert_eq!(wallet.count(methods::SEND_TRANSACTION), 1);

        assert_ok!(client.create_post("third", |_| {}).await);
        assert_eq!(wallet.count(methods::SEND_TRANSACTION), 2);
    }

    #[tokio::test]
    async fn test_cancel_pending_releases_the_guard() {
        let (_, client) =
            client_for(MockWallet::new(31337).with_polls_before_receipt(u32::MAX)).await;
        let mut in_flight = client.subscribe_in_flight();

        let stuck = {
            let client = client.clone();
            tokio::spawn(async move { client.create_post("stuck", |_| {}).await })
        };
        in_flight.wait_for(|busy| *busy).await.unwrap();
        client.cancel_pending().await;

        let err = assert_err!(stuck.await.unwrap());
        assert!(matches!(err, SocialError::Cancelled(_)));
        assert!(!client.in_flight());
    }

    #[tokio::test]
    async fn test_cancel_during_signing_ends_the_write() {
        let (wallet, client) =
            client_for(MockWallet::new(31337).with_latency(Duration::from_millis(50))).await;
        let mut in_flight = client.subscribe_in_flight();

        let signing = {
            let client = client.clone();
            tokio::spawn(async move { client.create_post("slow", |_| {}).await })
        };
        in_flight.wait_for(|busy| *busy).await.unwrap();
        client.cancel_pending().await;

        let err = assert_err!(signing.await.unwrap());
        assert!(matches!(err, SocialError::Cancelled(_)), "cancel was lost: {:?}", err);
        assert!(!client.in_flight());
        assert_eq!(wallet.count(methods::SEND_TRANSACTION), 1);
        assert_eq!(wallet.count(methods::GET_RECEIPT), 0);
    }

    #[tokio::test]
    async fn test_cancel_while_idle_does_not_affect_next_write() {
        let (_, client) = client_for(MockWallet::new(31337)).await;
        client.cancel_pending().await;
        assert_ok!(client.create_post("after cancel", |_| {}).await);
    }

    #[tokio::test]
    async fn test_rejected_signature_leaves_client_reusable() {
        let (wallet, client) = client_for(
            MockWallet::new(31337)
                .with_send_error(ProviderError::new(4001, "User denied transaction signature")),
        )
        .await;
        let err = assert_err!(client.create_post("nope", |_| {}).await);
        assert!(matches!(err, SocialError::UserRejected(_)));
        assert!(!client.in_flight());
        assert!(wallet.posts().is_empty());
    }

    #[tokio::test]
    async fn test_method_kind_is_enforced() {
        let (_, client) = client_for(MockWallet::new(31337)).await;
        assert!(matches!(
            client.call("createPost", &["x".into()]).await,
            Err(SocialError::UnknownMethod(_))
        ));
        assert!(matches!(
            client.transact("getPostsCount", &[], |_| {}).await,
            Err(SocialError::UnknownMethod(_))
        ));
        assert!(matches!(
            client.call("deletePost", &[]).await,
            Err(SocialError::UnknownMethod(_))
        ));
    }
}
