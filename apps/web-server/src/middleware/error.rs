//! Error handling - every failure renders as an [`ErrorResponse`] with a user-facing message.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use lectern_core::domain::ResetError;
use lectern_core::error::{BackendError, FlowError, FormError};
use lectern_core::ports::FlowStoreError;
use lectern_shared::ErrorResponse;
use std::fmt;

const SERVER_ERROR: &str = "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Input rejected before any backend call.
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// The backend refused the request; its status and message are passed on.
    Rejected { status: StatusCode, message: String },
    /// The backend failed or could not be reached.
    Upstream(String),
    Internal(String),
}

impl AppError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        AppError::Rejected {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            message: message.into(),
        }
    }

    /// Keep the backend's status but show a form-specific message.
    /// Transport failures answer 502.
    pub fn backend(err: &BackendError, message: impl Into<String>) -> Self {
        match err.status() {
            Some(status) => AppError::rejected(status, message),
            None => {
                tracing::error!("Backend failure: {}", err);
                AppError::Rejected {
                    status: StatusCode::BAD_GATEWAY,
                    message: message.into(),
                }
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Rejected { status, message } => {
                write!(f, "Rejected by backend ({}): {}", status, message)
            }
            AppError::Upstream(msg) => write!(f, "Backend failure: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Rejected { status, .. } => *status,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let title = status.canonical_reason().unwrap_or("Error");

        let error = match self {
            AppError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden(msg) => ErrorResponse::forbidden(msg.clone()),
            AppError::NotFound(msg) | AppError::Conflict(msg) => {
                ErrorResponse::new(status.as_u16(), title, msg.clone())
            }
            AppError::Rejected { message, .. } => {
                ErrorResponse::new(status.as_u16(), title, message.clone())
            }
            AppError::Upstream(detail) => {
                tracing::error!("Backend failure: {}", detail);
                ErrorResponse::new(502, title, SERVER_ERROR)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(status).json(error)
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ResetError> for AppError {
    fn from(err: ResetError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Default mapping. Handlers with form-specific messages map before this.
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        let message = err.server_message().map(String::from);
        match err.status() {
            Some(401) => AppError::Unauthorized,
            Some(403) => AppError::Forbidden(message.unwrap_or_else(|| "권한이 없습니다.".to_string())),
            Some(404) => AppError::NotFound(
                message.unwrap_or_else(|| "요청한 정보를 찾을 수 없습니다.".to_string()),
            ),
            Some(status @ 400..=499) => AppError::rejected(
                status,
                message.unwrap_or_else(|| "요청을 처리할 수 없습니다.".to_string()),
            ),
            _ => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<FlowStoreError> for AppError {
    fn from(err: FlowStoreError) -> Self {
        AppError::Internal(format!("flow store: {}", err))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: Option<&str>) -> BackendError {
        BackendError::Status {
            status,
            message: message.map(String::from),
        }
    }

    #[test]
    fn test_backend_status_mapping() {
        assert!(matches!(
            AppError::from(status(401, None)),
            AppError::Unauthorized
        ));
        assert_eq!(
            AppError::from(status(422, Some("잘못된 값"))).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(status(503, None)).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(BackendError::Timeout).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_form_specific_message_keeps_status() {
        let err = AppError::backend(&status(409, None), "이미 사용 중인 아이디입니다.");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let err = AppError::backend(&BackendError::Network("refused".into()), "x");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_form_error_is_bad_request() {
        let err = AppError::from(FormError::IdNotChecked);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Bad request: 아이디 중복 확인을 해주세요.");
    }
}
