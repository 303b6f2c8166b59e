//! # Lectern Shared
//!
//! Request and response types of the gateway's HTTP surface,
//! shared with any Rust client of the gateway.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
