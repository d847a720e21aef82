use actix_web::http::header;
use actix_web::web::{self, Bytes};
use actix_web::HttpResponse;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::services::{DisplayEvent, SocialService};

/// Display events as server-sent events. A slow reader skips what it missed.
pub fn event_stream(
    events: broadcast::Receiver<DisplayEvent>,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    BroadcastStream::new(events).filter_map(|item| match item {
        Ok(event) => Some(Ok(sse_frame(&event))),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!("📡 Event subscriber lagged, skipped {} events", skipped);
            None
        }
    })
}

fn sse_frame(event: &DisplayEvent) -> Bytes {
    let data = serde_json::to_string(&event.to_response()).unwrap_or_else(|_| "{}".to_string());
    Bytes::from(format!("event: {}\ndata: {}\n\n", event.name(), data))
}

pub async fn stream_events(service: web::Data<Arc<SocialService>>) -> HttpResponse {
    info!("📡 Display event subscriber attached");
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(event_stream(service.events().subscribe()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/events", web::get().to(stream_events));
}
