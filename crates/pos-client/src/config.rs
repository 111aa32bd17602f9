//! # Backend Configuration
//!
//! Where the order/menu/report web app lives and how long to wait for it.
//! Values are loaded from environment variables (and `.env`).

use pos_core::PosError;
use std::env;
use std::time::Duration;

/// Value the deployment pipeline substitutes with the real web app URL
pub const API_BASE_PLACEHOLDER: &str = "YOUR_WEBAPP_URL_HERE";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Web app endpoint; actions are selected with `?action=<name>`
    pub api_base: String,

    /// Per-request timeout; expiry surfaces as a network error
    pub timeout: Duration,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// - `POS_API_BASE` (required)
    /// - `POS_API_TIMEOUT_SECS` (optional, default 30)
    pub fn from_env() -> Result<Self, PosError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base = env::var("POS_API_BASE")
            .map_err(|_| PosError::Configuration("POS_API_BASE not set".to_string()))?;

        let timeout_secs = match env::var("POS_API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PosError::Configuration(format!("POS_API_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self::new(api_base).with_timeout(Duration::from_secs(timeout_secs));
        config.validate()?;
        Ok(config)
    }

    /// Create config with an explicit endpoint (for testing)
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject unset placeholders, non-HTTP endpoints and a zero timeout
    pub fn validate(&self) -> Result<(), PosError> {
        let base = self.api_base.trim();

        if base.is_empty() || base == API_BASE_PLACEHOLDER {
            return Err(PosError::Configuration(
                "POS_API_BASE still holds the deployment placeholder".to_string(),
            ));
        }

        if !base.starts_with("https://") && !base.starts_with("http://") {
            return Err(PosError::Configuration(
                "POS_API_BASE must start with http:// or https://".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(PosError::Configuration(
                "POS_API_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Plain HTTP is only acceptable for a backend on this machine
    pub fn is_local(&self) -> bool {
        let base = self.api_base.trim_start_matches("http://");
        base.starts_with("127.0.0.1") || base.starts_with("localhost")
    }
}
