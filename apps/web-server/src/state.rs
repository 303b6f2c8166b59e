//! Application state - shared across all handlers.

use std::sync::Arc;

use lectern_core::domain::purchase::InFlightRegistry;
use lectern_core::ports::{Backend, FlowStore, RateLimiter, SessionCodec};
use lectern_infra::{HttpBackend, InMemoryFlowStore, JwtSessionCodec};

use crate::config::{AppConfig, CheckoutConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub sessions: Arc<dyn SessionCodec>,
    pub flows: Arc<dyn FlowStore>,
    /// Applied to the credential forms. `None` disables limiting.
    pub limiter: Option<Arc<dyn RateLimiter>>,
    /// Purchase checks currently waiting on the backend, keyed by member.
    pub in_flight: InFlightRegistry,
    pub checkout: CheckoutConfig,
    pub cookie_secure: bool,
    pub trust_proxy: bool,
}

impl AppState {
    /// Build the application state with the configured implementations.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let backend = HttpBackend::new(config.backend.clone())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
        tracing::info!(base_url = %config.backend.base_url, "Backend client ready");

        let sessions: Arc<dyn SessionCodec> =
            Arc::new(JwtSessionCodec::new(config.session.clone()));

        Ok(Self {
            backend: Arc::new(backend),
            sessions,
            flows: Self::flow_store().await,
            limiter: Self::rate_limiter(),
            in_flight: InFlightRegistry::new(),
            checkout: config.checkout.clone(),
            cookie_secure: config.cookie_secure,
            trust_proxy: config.trust_proxy,
        })
    }

    #[cfg(feature = "redis")]
    async fn flow_store() -> Arc<dyn FlowStore> {
        use lectern_infra::{RedisConfig, RedisFlowStore};

        let Some(redis) = RedisConfig::from_env() else {
            tracing::warn!("REDIS_URL not set. Form flows are kept in memory (single instance only).");
            return Arc::new(InMemoryFlowStore::new());
        };

        match RedisFlowStore::new(redis).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}. Using in-memory flow store.", e);
                Arc::new(InMemoryFlowStore::new())
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn flow_store() -> Arc<dyn FlowStore> {
        tracing::info!("Running without redis feature - using in-memory flow store");
        Arc::new(InMemoryFlowStore::new())
    }

    #[cfg(feature = "rate-limit")]
    fn rate_limiter() -> Option<Arc<dyn RateLimiter>> {
        Some(Arc::new(lectern_infra::InMemoryRateLimiter::from_env()))
    }

    #[cfg(not(feature = "rate-limit"))]
    fn rate_limiter() -> Option<Arc<dyn RateLimiter>> {
        None
    }
}
