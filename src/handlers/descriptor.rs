use actix_web::{web, HttpResponse, Result};
use std::sync::Arc;

use crate::services::SocialService;

/// The loaded `{address, abi, chainId}` document.
pub async fn contract_descriptor(service: web::Data<Arc<SocialService>>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.descriptor().to_json()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/contract.json", web::get().to(contract_descriptor));
}
