use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use std::sync::Arc;

use crate::services::SocialService;

pub async fn health_check(service: web::Data<Arc<SocialService>>) -> Result<HttpResponse> {
    let connected = service.is_connected().await;
    let status = if connected { "healthy" } else { "degraded" };
    Ok(HttpResponse::Ok().json(json!({
        "status": status,
        "service": "chain-social",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "wallet": {
            "connected": connected,
            "chain_id": service.descriptor().chain_id,
        }
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(health_check));
}
