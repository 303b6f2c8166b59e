//! Error body returned by every failing gateway route.

use serde::{Deserialize, Serialize};

/// Loosely modelled on RFC 7807; `message` is what the page shows the user.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP status code.
    pub status: u16,

    /// Short English summary of the status, for logs and tooling.
    pub title: String,

    /// User-facing message, shown inline next to the form.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", message)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized", "로그인이 필요합니다.")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, "Forbidden", message)
    }

    pub fn internal_error() -> Self {
        Self::new(
            500,
            "Internal Server Error",
            "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.",
        )
    }
}
