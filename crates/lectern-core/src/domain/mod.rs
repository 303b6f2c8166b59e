//! Domain entities and the credential / checkout state machines.

pub mod admin;
pub mod catalog;
pub mod credentials;
pub mod member;
pub mod password_reset;
pub mod payment;
pub mod phone;
pub mod purchase;
pub mod signup;

pub use member::{AccessDenied, Authorize, Landing, Role, Session, SessionUser};
pub use password_reset::{PasswordReset, ResetError, ResetStage};
pub use signup::SignupDraft;
