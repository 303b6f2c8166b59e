//! Domain-level error types.
//!
//! `Display` of [`FormError`] and [`FlowError`] is the user-facing message shown
//! next to the form, so those strings are Korean and stable.

use thiserror::Error;

/// Client-side validation failures. Raised before any backend call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("아이디와 비밀번호를 입력해주세요.")]
    MissingCredentials,

    #[error("아이디는 4~20자의 영문, 숫자, 밑줄만 사용할 수 있습니다.")]
    InvalidId,

    #[error("비밀번호는 8~20자로 입력해주세요.")]
    InvalidPassword,

    #[error("비밀번호가 일치하지 않습니다.")]
    PasswordMismatch,

    #[error("이름을 입력해주세요.")]
    NameRequired,

    #[error("닉네임은 2~20자로 입력해주세요.")]
    InvalidNick,

    #[error("올바른 이메일 주소를 입력해주세요.")]
    InvalidEmail,

    #[error("휴대폰 번호 11자리를 입력해주세요.")]
    InvalidPhone,

    #[error("아이디 중복 확인을 해주세요.")]
    IdNotChecked,

    #[error("이미 사용 중인 아이디입니다.")]
    IdTaken,

    #[error("닉네임 중복 확인을 해주세요.")]
    NickNotChecked,

    #[error("이미 사용 중인 닉네임입니다.")]
    NickTaken,

    #[error("이용약관에 동의해주세요.")]
    TermsNotAccepted,

    #[error("개인정보 처리방침에 동의해주세요.")]
    PrivacyNotAccepted,

    #[error("인증번호를 입력해주세요.")]
    CodeRequired,

    #[error("회원 레벨은 1~10 사이여야 합니다.")]
    InvalidLevel,

    #[error("결제 정보가 올바르지 않습니다.")]
    InvalidPaymentParams,
}

/// Invalid transitions of the multi-step credential flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("유효하지 않은 요청입니다.")]
    InvalidRequest,

    #[error("인증 시간이 만료되었습니다. 처음부터 다시 진행해주세요.")]
    Expired,
}

/// Failures talking to the backend REST API.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend responded with {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status of the backend response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's own `message` field, when it sent a non-empty one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Status {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_ignores_blank() {
        let err = BackendError::Status {
            status: 400,
            message: Some("  ".to_string()),
        };
        assert_eq!(err.server_message(), None);
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = BackendError::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.server_message(), None);
    }
}
