//! # Lectern Core
//!
//! The domain layer of the Lectern storefront gateway: session and role model,
//! credential form state machines, purchase gating and payment return parsing.
//! This crate performs no I/O; the backend and stores are reached through [`ports`].

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{BackendError, FlowError, FormError};
