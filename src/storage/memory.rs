use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::feed::Feed;

/// Latest assembled feed, shared between the service and the HTTP handlers.
#[derive(Debug, Clone)]
pub struct FeedStore {
    latest: Arc<RwLock<Option<Feed>>>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Swaps in a fully assembled feed.
    pub async fn replace(&self, feed: Feed) {
        let mut latest = self.latest.write().await;
        *latest = Some(feed);
    }

    pub async fn latest(&self) -> Option<Feed> {
        let latest = self.latest.read().await;
        latest.clone()
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}
