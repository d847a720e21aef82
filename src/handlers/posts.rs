use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::handlers::error_response;
use crate::models::Post;
use crate::services::SocialService;

#[derive(Debug, Deserialize)]
pub struct NewPost {
    pub content: String,
}

pub async fn create_post(
    req_body: web::Json<NewPost>,
    service: web::Data<Arc<SocialService>>,
) -> Result<HttpResponse> {
    match service.create_post(&req_body.content).await {
        Ok(Some(receipt)) => Ok(HttpResponse::Created().json(json!({
            "transaction_hash": receipt.transaction_hash,
            "block_number": receipt.block(),
            "status": "posted"
        }))),
        Ok(None) => Ok(HttpResponse::Ok().json(json!({
            "status": "ignored",
            "message": "Empty post"
        }))),
        Err(e) => {
            tracing::error!("Failed to create post: {}", e);
            Ok(error_response(&e))
        }
    }
}

pub async fn like_post(
    path: web::Path<String>,
    service: web::Data<Arc<SocialService>>,
) -> Result<HttpResponse> {
    let post_id = match Post::parse_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };
    match service.like_post(post_id).await {
        Ok(receipt) => Ok(HttpResponse::Ok().json(json!({
            "id": post_id,
            "transaction_hash": receipt.transaction_hash,
            "block_number": receipt.block(),
            "status": "liked"
        }))),
        Err(e) => {
            tracing::error!("Failed to like post {}: {}", post_id, e);
            Ok(error_response(&e))
        }
    }
}

pub async fn cancel_pending(service: web::Data<Arc<SocialService>>) -> Result<HttpResponse> {
    match service.cancel_pending().await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "message": "Pending receipt wait cancelled" }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_status(service: web::Data<Arc<SocialService>>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.status().await))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/posts", web::post().to(create_post))
        .route("/api/v1/posts/{id}/like", web::post().to(like_post))
        .route("/api/v1/pending/cancel", web::post().to(cancel_pending))
        .route("/api/v1/status", web::get().to(get_status));
}
