//! Application configuration loaded from environment variables.

use std::env;

use lectern_infra::{BackendConfig, SessionConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub checkout: CheckoutConfig,
    /// Mark cookies `Secure`. Enable whenever the gateway is served over HTTPS.
    pub cookie_secure: bool,
    /// Rate limit on the forwarded client address. Only behind a proxy that sets it.
    pub trust_proxy: bool,
}

/// What the payment widget needs from the gateway.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Toss Payments client key, handed to the browser as is.
    pub client_key: String,
    /// Public origin used to build the provider's return URLs.
    pub public_base_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let client_key = env::var("TOSS_CLIENT_KEY").unwrap_or_default();
        if client_key.is_empty() {
            tracing::warn!("TOSS_CLIENT_KEY not set. The payment widget will refuse to open.");
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            backend: BackendConfig::from_env(),
            session: SessionConfig::from_env(),
            checkout: CheckoutConfig {
                client_key,
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            },
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            trust_proxy: env::var("TRUST_PROXY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
