use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::services::feed::{Feed, FeedView};

/// Status line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Connected,
    Posting { tx_hash: Option<String> },
    Posted,
    Liking { tx_hash: Option<String> },
    Liked,
    Error(String),
}

impl Status {
    /// Transaction hash carried by a pending status, once known.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Status::Posting { tx_hash } | Status::Liking { tx_hash } => tx_hash.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Connected => write!(f, "connected"),
            Status::Posting { .. } => write!(f, "posting…"),
            Status::Posted => write!(f, "posted"),
            Status::Liking { .. } => write!(f, "liking…"),
            Status::Liked => write!(f, "liked"),
            Status::Error(message) => write!(f, "error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Status(Status),
    Network(String),
    FeedReady(Feed),
    InFlight(bool),
}

impl DisplayEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            DisplayEvent::Status(_) => "status",
            DisplayEvent::Network(_) => "network",
            DisplayEvent::FeedReady(_) => "feed_ready",
            DisplayEvent::InFlight(_) => "in_flight",
        }
    }

    pub fn to_response(&self) -> EventView {
        match self {
            DisplayEvent::Status(status) => EventView::Status {
                status: status.to_string(),
                detail: status.detail().map(str::to_string),
            },
            DisplayEvent::Network(banner) => EventView::Network {
                banner: banner.clone(),
            },
            DisplayEvent::FeedReady(feed) => EventView::FeedReady {
                feed: feed.to_response(),
            },
            DisplayEvent::InFlight(busy) => EventView::InFlight { in_flight: *busy },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventView {
    Status {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Network {
        banner: String,
    },
    FeedReady {
        feed: FeedView,
    },
    InFlight {
        in_flight: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub in_flight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// Fan-out of display events to whoever renders them.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DisplayEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: DisplayEvent) {
        match &event {
            DisplayEvent::Status(status) => match status.detail() {
                Some(hash) => info!("📣 {} {}", status, hash),
                None => info!("📣 {}", status),
            },
            DisplayEvent::Network(banner) => info!("🌐 {}", banner),
            DisplayEvent::FeedReady(feed) => info!("📰 Feed ready: {} posts", feed.posts.len()),
            DisplayEvent::InFlight(busy) => debug!("in flight: {}", busy),
        }
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(Status::Connected.to_string(), "connected");
        assert_eq!(Status::Posting { tx_hash: Some("0xab".into()) }.to_string(), "posting…");
        assert_eq!(Status::Posted.to_string(), "posted");
        assert_eq!(Status::Liking { tx_hash: None }.to_string(), "liking…");
        assert_eq!(Status::Liked.to_string(), "liked");
        assert_eq!(Status::Error("boom".into()).to_string(), "error: boom");
        assert_eq!(Status::Posting { tx_hash: Some("0xab".into()) }.detail(), Some("0xab"));
        assert_eq!(Status::Posted.detail(), None);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(DisplayEvent::InFlight(true));
        bus.publish(DisplayEvent::Status(Status::Posted));

        assert_eq!(rx.recv().await.unwrap(), DisplayEvent::InFlight(true));
        assert_eq!(rx.recv().await.unwrap(), DisplayEvent::Status(Status::Posted));
    }

    #[test]
    fn test_event_views() {
        let posting = DisplayEvent::Status(Status::Posting { tx_hash: Some("0xab".into()) });
        assert_eq!(posting.name(), "status");
        assert_eq!(
            serde_json::to_value(posting.to_response()).unwrap(),
            serde_json::json!({ "type": "status", "status": "posting…", "detail": "0xab" })
        );

        let busy = DisplayEvent::InFlight(true);
        assert_eq!(busy.name(), "in_flight");
        assert_eq!(
            serde_json::to_value(busy.to_response()).unwrap(),
            serde_json::json!({ "type": "in_flight", "in_flight": true })
        );

        let feed = DisplayEvent::FeedReady(Feed::empty());
        let view = serde_json::to_value(feed.to_response()).unwrap();
        assert_eq!(view["type"], "feed_ready");
        assert_eq!(view["feed"]["message"], "No posts yet.");
    }

    #[test]
    fn test_publish_without_subscribers() {
        EventBus::new(4).publish(DisplayEvent::Network("Connected".into()));
    }
}
