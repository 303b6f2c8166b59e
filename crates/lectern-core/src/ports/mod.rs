//! Ports - trait definitions for external dependencies.
//! Infrastructure implements these; the gateway only talks to the traits.

mod backend;
pub mod flow_store;
mod rate_limit;
mod session;

pub use backend::{
    AdminBackend, AuthBackend, Backend, CatalogBackend, PaymentBackend, QueryPairs,
};
pub use flow_store::{FlowStore, FlowStoreError};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use session::{AuthError, SessionCodec};
