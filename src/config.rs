use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub contract: ContractConfig,
    pub network: NetworkConfig,
    pub polling: PollingConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub rpc_url: String,
    /// Signer to report for `eth_requestAccounts`; the node's first account when unset.
    pub account: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContractConfig {
    /// Path or `http(s)://` URL of the `{address, abi, chainId}` document.
    pub descriptor: String,
}

/// Chain registration details offered to the wallet when it does not know the contract's chain.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub chain_name_prefix: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub rpc_urls: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub window: u64,
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        tracing::info!("Loading configuration...");

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CHAIN_SOCIAL").separator("__"))
            .build()?;

        let mut config: AppConfig = match settings.try_deserialize() {
            Ok(config) => {
                tracing::info!("Configuration loaded from file/environment");
                config
            }
            Err(e) => {
                tracing::warn!("Could not load configuration from file/environment ({}), using defaults", e);
                AppConfig::default()
            }
        };

        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            config.provider.rpc_url = rpc_url;
        }

        if let Ok(descriptor) = std::env::var("CONTRACT_DESCRIPTOR") {
            config.contract.descriptor = descriptor;
        }

        tracing::info!("Final configuration:");
        tracing::info!("  Server: {}:{}", config.server.host, config.server.port);
        tracing::info!("  Provider RPC: {}", config.provider.rpc_url);
        tracing::info!("  Contract descriptor: {}", config.contract.descriptor);
        tracing::info!(
            "  Receipt polling: every {}ms, give up after {}s",
            config.polling.interval_ms,
            config.polling.timeout_seconds
        );
        tracing::info!("  Feed window: {}", config.feed.window);

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            account: None,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            descriptor: "static/contract.json".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_name_prefix: "Local Chain".to_string(),
            currency_name: "ETH".to_string(),
            currency_symbol: "ETH".to_string(),
            currency_decimals: 18,
            rpc_urls: vec!["http://127.0.0.1:8545".to_string()],
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            timeout_seconds: 120,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { window: 50 }
    }
}
