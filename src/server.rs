use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer, Result};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::contracts::abi::MethodTable;
use crate::handlers;
use crate::services::SocialService;

pub struct SocialServer {
    service: Arc<SocialService>,
    config: AppConfig,
}

impl SocialServer {
    pub fn new(service: Arc<SocialService>, config: AppConfig) -> Self {
        Self { service, config }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let bind_address = format!("{}:{}", self.config.server.host, self.config.server.port);
        tracing::info!("Starting HTTP server on {}", bind_address);

        let service = self.service;
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .app_data(web::Data::new(service.clone()))
                .wrap(cors)
                .wrap(Logger::default())
                .configure(handlers::health::config)
                .configure(handlers::descriptor::config)
                .configure(handlers::feed::config)
                .configure(handlers::posts::config)
                .configure(handlers::events::config)
                .route("/", web::get().to(api_info))
        })
        .bind(&bind_address)?
        .run()
        .await
    }
}

async fn api_info() -> Result<actix_web::HttpResponse> {
    let methods: Vec<serde_json::Value> = MethodTable::new()
        .iter()
        .map(|m| {
            serde_json::json!({
                "signature": m.signature,
                "selector": format!("0x{}", hex::encode(m.selector)),
            })
        })
        .collect();

    Ok(actix_web::HttpResponse::Ok().json(serde_json::json!({
        "name": "chain-social",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Microblog client for an on-chain post contract",
        "endpoints": {
            "health": "GET /api/v1/health",
            "contract": "GET /contract.json",
            "feed": "GET /api/v1/feed",
            "refresh_feed": "POST /api/v1/feed/refresh",
            "create_post": "POST /api/v1/posts",
            "like_post": "POST /api/v1/posts/{id}/like",
            "cancel_pending": "POST /api/v1/pending/cancel",
            "status": "GET /api/v1/status",
            "events": "GET /api/v1/events"
        },
        "contract_methods": methods
    })))
}
