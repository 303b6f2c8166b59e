//! Backend REST API client.

mod client;

pub use client::{BackendConfig, HttpBackend};
