use chrono::{DateTime, Utc};
use serde::Serialize;
use std::iter::Rev;
use std::ops::Range;
use tracing::info;

use crate::contracts::SocialClient;
use crate::error::SocialResult;
use crate::models::{Post, PostView};

pub const DEFAULT_WINDOW: u64 = 50;
pub const EMPTY_FEED_MESSAGE: &str = "No posts yet.";

/// The newest `window` post ids out of `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    count: u64,
    window: u64,
}

impl FeedWindow {
    pub fn new(count: u64, window: u64) -> Self {
        Self { count, window }
    }

    /// `max(0, count - window) .. count - 1`, newest first.
    pub fn indices(&self) -> Rev<Range<u64>> {
        (self.count.saturating_sub(self.window)..self.count).rev()
    }

    pub fn len(&self) -> usize {
        self.count.min(self.window) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh pass over the window; each call starts from the newest post again.
    pub fn cursor<'a>(&self, client: &'a SocialClient) -> FeedCursor<'a> {
        FeedCursor {
            client,
            indices: self.indices(),
        }
    }
}

/// Lazily reads one post per step.
pub struct FeedCursor<'a> {
    client: &'a SocialClient,
    indices: Rev<Range<u64>>,
}

impl FeedCursor<'_> {
    pub async fn next(&mut self) -> Option<SocialResult<Post>> {
        let id = self.indices.next()?;
        Some(self.client.get_post(id).await)
    }
}

/// An assembled, ordered snapshot of the newest posts.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub total: u64,
    pub posts: Vec<Post>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub total: u64,
    pub shown: usize,
    pub posts: Vec<PostView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub fetched_at: String,
}

impl Feed {
    pub fn empty() -> Self {
        Self {
            total: 0,
            posts: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<u64> {
        self.posts.iter().map(|p| p.id).collect()
    }

    pub fn to_response(&self) -> FeedView {
        FeedView {
            total: self.total,
            shown: self.posts.len(),
            posts: self.posts.iter().map(Post::to_response).collect(),
            message: self.is_empty().then(|| EMPTY_FEED_MESSAGE.to_string()),
            fetched_at: self.fetched_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeedAssembler {
    window: u64,
}

impl FeedAssembler {
    pub fn new(window: u64) -> Self {
        Self { window }
    }

    /// Reads the count, then every post in the window, one request at a time. Any failed read
    /// fails the whole assembly so a partial feed is never published.
    pub async fn assemble(&self, client: &SocialClient) -> SocialResult<Feed> {
        let total = client.get_posts_count().await?;
        let window = FeedWindow::new(total, self.window);
        info!("📰 Assembling feed: {} of {} posts", window.len(), total);

        let mut posts = Vec::with_capacity(window.len());
        let mut cursor = window.cursor(client);
        while let Some(post) = cursor.next().await {
            posts.push(post?);
        }

        Ok(Feed {
            total,
            posts,
            fetched_at: Utc::now(),
        })
    }
}

impl Default for FeedAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
