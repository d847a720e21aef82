mod config;
mod contracts;
mod error;
mod handlers;
mod models;
mod server;
mod services;
mod storage;

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::contracts::{HttpProvider, WalletProvider};
use crate::models::ContractDescriptor;
use crate::server::SocialServer;
use crate::services::SocialService;
use crate::storage::FeedStore;

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting chain-social");

    let config = AppConfig::load().await?;
    info!("Configuration loaded successfully");

    let descriptor = ContractDescriptor::load(&config.contract.descriptor).await?;

    let provider: Option<Arc<dyn WalletProvider>> = match HttpProvider::new(&config.provider) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!("Wallet provider unavailable: {}", e);
            None
        }
    };

    let store = FeedStore::new();
    let service = Arc::new(SocialService::new(&config, descriptor, provider, store));

    // The server stays up on a failed connect; status and health report the error.
    if let Err(e) = service.connect().await {
        error!("Initial wallet connection failed: {}", e);
    }

    let server = SocialServer::new(service, config.clone());
    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
    }

    Ok(())
}
