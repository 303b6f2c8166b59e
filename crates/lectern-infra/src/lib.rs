//! # Lectern Infrastructure
//!
//! Concrete implementations of the ports defined in `lectern-core`:
//! the backend REST client, session cookie signing, flow stores and rate limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory flow store and backend client only
//! - `session` - JWT-signed session cookies
//! - `rate-limit` - Rate limiting via governor
//! - `redis` - Redis-backed flow store

pub mod flow;
pub mod http;

#[cfg(feature = "session")]
pub mod session;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use flow::InMemoryFlowStore;
pub use http::{BackendConfig, HttpBackend};

#[cfg(feature = "session")]
pub use session::{JwtSessionCodec, SessionConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "redis")]
pub use flow::{RedisConfig, RedisFlowStore};
