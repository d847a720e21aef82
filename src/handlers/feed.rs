use actix_web::{web, HttpResponse, Result};
use std::sync::Arc;

use crate::handlers::error_response;
use crate::services::SocialService;

pub async fn get_feed(service: web::Data<Arc<SocialService>>) -> Result<HttpResponse> {
    let feed = service.latest_feed().await;
    Ok(HttpResponse::Ok().json(feed.to_response()))
}

pub async fn refresh_feed(service: web::Data<Arc<SocialService>>) -> Result<HttpResponse> {
    match service.refresh().await {
        Ok(feed) => Ok(HttpResponse::Ok().json(feed.to_response())),
        Err(e) => {
            tracing::warn!("Feed refresh failed: {}", e);
            Ok(error_response(&e))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/feed", web::get().to(get_feed))
        .route("/api/v1/feed/refresh", web::post().to(refresh_feed));
}
