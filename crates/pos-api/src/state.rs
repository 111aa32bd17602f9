//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the backend, the register's single cart ledger, its submitter and the
//! staff session.

use pos_client::HttpOrderService;
use pos_core::{
    AuthToken, BoxedCartStore, BoxedOrderService, CartLedger, Currency, FileCartStore,
    OrderSubmitter, PosError, SharedLedger, DEFAULT_CART_SLOT,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding the cart slot; `None` keeps the cart in memory only
    pub cart_dir: Option<PathBuf>,
    /// Slot key inside `cart_dir`
    pub cart_slot: String,
    /// Currency used for display strings
    pub currency: Currency,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            cart_dir: None,
            cart_slot: DEFAULT_CART_SLOT.to_string(),
            currency: Currency::PHP,
        }
    }
}

impl AppConfig {
    /// `config/deli-pos.toml` if present, then environment overrides
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = load_config_file()?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML config document
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(host) = std::env::var("HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port: {}", port))?;
        }
        if let Ok(environment) = std::env::var("ENVIRONMENT") {
            self.environment = environment;
        }
        if let Ok(dir) = std::env::var("POS_CART_DIR") {
            self.cart_dir = (!dir.trim().is_empty()).then(|| PathBuf::from(dir));
        }
        if let Ok(currency) = std::env::var("POS_CURRENCY") {
            self.currency = currency.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// The cart slot, if persistence is configured
    pub fn cart_store(&self) -> Option<BoxedCartStore> {
        self.cart_dir
            .as_deref()
            .map(|dir| Arc::new(FileCartStore::new(dir, self.cart_slot.clone())) as BoxedCartStore)
    }
}

fn load_config_file() -> anyhow::Result<AppConfig> {
    let config_paths = [
        "config/deli-pos.toml",
        "../config/deli-pos.toml",
        "../../config/deli-pos.toml",
    ];

    for path in config_paths {
        if Path::new(path).exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
            let config = AppConfig::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded configuration from {}", path);
            return Ok(config);
        }
    }

    tracing::debug!("No config file found, using defaults");
    Ok(AppConfig::default())
}

/// The logged-in staff member's token, held in memory only
#[derive(Clone, Default)]
pub struct StaffSession {
    token: Arc<RwLock<Option<AuthToken>>>,
}

impl StaffSession {
    pub async fn token(&self) -> Option<AuthToken> {
        self.token.read().await.clone()
    }

    pub async fn require(&self) -> Result<AuthToken, PosError> {
        self.token().await.ok_or(PosError::NotAuthenticated)
    }

    pub async fn start(&self, token: AuthToken) {
        *self.token.write().await = Some(token);
    }

    pub async fn end(&self) {
        *self.token.write().await = None;
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Order/menu/report backend
    pub service: BoxedOrderService,
    /// The register's cart
    pub ledger: SharedLedger,
    /// Submits `ledger`, one order at a time
    pub submitter: Arc<OrderSubmitter>,
    pub session: StaffSession,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the web app configured in the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::load()?;

        let service = HttpOrderService::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize backend: {}", e))?;

        Ok(Self::with_service(Arc::new(service), config))
    }

    /// Assemble state around any backend (used by tests)
    pub fn with_service(service: BoxedOrderService, config: AppConfig) -> Self {
        let ledger = match config.cart_store() {
            Some(store) => CartLedger::restore(store),
            None => CartLedger::new(),
        }
        .into_shared();

        let submitter = Arc::new(OrderSubmitter::new(service.clone(), ledger.clone()));

        Self {
            service,
            ledger,
            submitter,
            session: StaffSession::default(),
            config,
        }
    }
}
