use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::contracts::execution::WalletProvider;
use crate::contracts::operations::{
    ChainRegistration, PendingTransaction, ReceiptPolicy, Session, SocialClient, TransactionReceipt,
};
use crate::error::{SocialError, SocialResult};
use crate::models::ContractDescriptor;
use crate::services::events::{DisplayEvent, EventBus, Status, StatusView};
use crate::services::feed::{Feed, FeedAssembler};
use crate::storage::FeedStore;

/// User actions (connect, refresh, post, like) and the display state they drive.
pub struct SocialService {
    descriptor: ContractDescriptor,
    provider: Option<Arc<dyn WalletProvider>>,
    registration: ChainRegistration,
    policy: ReceiptPolicy,
    assembler: FeedAssembler,
    client: RwLock<Option<Arc<SocialClient>>>,
    store: FeedStore,
    events: EventBus,
    status: watch::Sender<Status>,
    network: watch::Sender<Option<String>>,
}

impl SocialService {
    pub fn new(
        config: &AppConfig,
        descriptor: ContractDescriptor,
        provider: Option<Arc<dyn WalletProvider>>,
        store: FeedStore,
    ) -> Self {
        Self {
            descriptor,
            provider,
            registration: ChainRegistration::from(&config.network),
            policy: ReceiptPolicy::from(&config.polling),
            assembler: FeedAssembler::new(config.feed.window),
            client: RwLock::new(None),
            store,
            events: EventBus::default(),
            status: watch::channel(Status::Idle).0,
            network: watch::channel(None).0,
        }
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Connect the wallet, publish the network banner and load the first feed.
    pub async fn connect(&self) -> SocialResult<()> {
        let session = match Session::connect(
            self.provider.clone(),
            self.descriptor.clone(),
            &self.registration,
        )
        .await
        {
            Ok(session) => session,
            Err(e) => {
                error!("❌ Wallet connection failed: {}", e);
                self.set_status(Status::Error(e.to_string()));
                return Err(e);
            }
        };

        let banner = session.banner();
        let client = Arc::new(SocialClient::new(Arc::new(session), self.policy));
        self.forward_in_flight(&client);
        *self.client.write().await = Some(client);

        self.network.send_replace(Some(banner.clone()));
        self.events.publish(DisplayEvent::Network(banner));
        self.set_status(Status::Connected);

        self.refresh().await.map(|_| ())
    }

    /// Re-read the newest posts and publish them.
    pub async fn refresh(&self) -> SocialResult<Feed> {
        let client = self.client().await?;
        match self.assembler.assemble(&client).await {
            Ok(feed) => {
                self.store.replace(feed.clone()).await;
                self.events.publish(DisplayEvent::FeedReady(feed.clone()));
                Ok(feed)
            }
            Err(e) => {
                warn!("❌ Feed refresh failed: {}", e);
                self.set_status(Status::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Publish `content` (trimmed). Blank content is ignored and yields `Ok(None)`.
    pub async fn create_post(&self, content: &str) -> SocialResult<Option<TransactionReceipt>> {
        let content = content.trim();
        if content.is_empty() {
            info!("Ignoring empty post");
            return Ok(None);
        }
        let client = self.client().await?;

        let result = client
            .create_post(content, |pending: &PendingTransaction| {
                self.set_status(Status::Posting {
                    tx_hash: Some(pending.transaction_hash.clone()),
                })
            })
            .await;

        self.settle(result, Status::Posted).await.map(Some)
    }

    pub async fn like_post(&self, id: u64) -> SocialResult<TransactionReceipt> {
        let client = self.client().await?;

        let result = client
            .like_post(id, |pending: &PendingTransaction| {
                self.set_status(Status::Liking {
                    tx_hash: Some(pending.transaction_hash.clone()),
                })
            })
            .await;

        self.settle(result, Status::Liked).await
    }

    pub async fn cancel_pending(&self) -> SocialResult<()> {
        self.client().await?.cancel_pending().await;
        Ok(())
    }

    pub async fn in_flight(&self) -> bool {
        match self.client.read().await.as_ref() {
            Some(client) => client.in_flight(),
            None => false,
        }
    }

    pub async fn status(&self) -> StatusView {
        let status = self.status.borrow().clone();
        StatusView {
            status: status.to_string(),
            detail: status.detail().map(str::to_string),
            in_flight: self.in_flight().await,
            network: self.network.borrow().clone(),
        }
    }

    pub async fn latest_feed(&self) -> Feed {
        self.store.latest().await.unwrap_or_else(Feed::empty)
    }

    async fn client(&self) -> SocialResult<Arc<SocialClient>> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(SocialError::NotConnected)
    }

    /// Publish the outcome of a write; refresh the feed after a success.
    async fn settle(
        &self,
        result: SocialResult<TransactionReceipt>,
        done: Status,
    ) -> SocialResult<TransactionReceipt> {
        match result {
            Ok(receipt) => {
                self.set_status(done);
                // A failed refresh is reported through the status line; the write itself landed.
                let _ = self.refresh().await;
                Ok(receipt)
            }
            // The pending write keeps its status.
            Err(SocialError::OperationInFlight) => Err(SocialError::OperationInFlight),
            Err(e) => {
                error!("❌ {}", e);
                self.set_status(Status::Error(e.to_string()));
                Err(e)
            }
        }
    }

    fn set_status(&self, status: Status) {
        self.status.send_replace(status.clone());
        self.events.publish(DisplayEvent::Status(status));
    }

    fn forward_in_flight(&self, client: &SocialClient) {
        let mut in_flight = client.subscribe_in_flight();
        let events = self.events.clone();
        tokio::spawn(async move {
            while in_flight.changed().await.is_ok() {
                let busy = *in_flight.borrow_and_update();
                events.publish(DisplayEvent::InFlight(busy));
            }
        });
    }
}
