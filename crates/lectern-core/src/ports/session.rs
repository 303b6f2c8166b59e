//! Session cookie signing port.

use crate::domain::Session;

/// Turns a [`Session`] into the signed `session` cookie value and back.
///
/// This is the only place session state lives; nothing else keeps a copy.
pub trait SessionCodec: Send + Sync {
    fn issue(&self, session: &Session) -> Result<String, AuthError>;

    fn verify(&self, value: &str) -> Result<Session, AuthError>;

    /// Cookie `Max-Age`, matching the token expiry.
    fn lifetime_seconds(&self) -> i64;
}

/// Session codec errors. All of them mean "treat as logged out".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Session expired")]
    Expired,

    #[error("Invalid session: {0}")]
    Invalid(String),

    #[error("Failed to sign session: {0}")]
    Signing(String),
}
