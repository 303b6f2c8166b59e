//! Session cookie signing.

mod jwt;

pub use jwt::{JwtSessionCodec, SessionConfig};
