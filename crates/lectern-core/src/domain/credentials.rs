//! Login and find-id inputs plus the field validators shared by every form.

use serde::{Deserialize, Serialize};

use super::member::SessionUser;
use super::phone::normalize_phone;
use crate::error::{BackendError, FormError};

pub fn validate_id(mb_id: &str) -> Result<(), FormError> {
    let len = mb_id.chars().count();
    let charset_ok = mb_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !(4..=20).contains(&len) || !charset_ok {
        return Err(FormError::InvalidId);
    }
    Ok(())
}

pub fn validate_password(password: &str, confirm: &str) -> Result<(), FormError> {
    if !(8..=20).contains(&password.chars().count()) {
        return Err(FormError::InvalidPassword);
    }
    if password != confirm {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_nick(mb_nick: &str) -> Result<(), FormError> {
    if !(2..=20).contains(&mb_nick.trim().chars().count()) {
        return Err(FormError::InvalidNick);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FormError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(FormError::InvalidEmail),
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub mb_id: String,
    pub mb_password: String,
}

impl LoginCredentials {
    pub fn new(mb_id: &str, mb_password: &str) -> Result<Self, FormError> {
        let mb_id = mb_id.trim();
        if mb_id.is_empty() || mb_password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(Self {
            mb_id: mb_id.to_string(),
            mb_password: mb_password.to_string(),
        })
    }
}

/// Response of `POST /api/auth/login`.
///
/// Older backends put `needProfileUpdate` at the top level instead of on the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginGrant {
    pub access_token: String,
    pub user: SessionUser,
    #[serde(default, rename = "needProfileUpdate")]
    pub need_profile_update: bool,
}

impl LoginGrant {
    pub fn into_session(self) -> super::member::Session {
        let mut user = self.user;
        user.need_profile_update |= self.need_profile_update;
        super::member::Session::new(user, self.access_token)
    }
}

/// Message shown when the backend refuses a login.
pub fn login_failure_message(err: &BackendError) -> String {
    if let Some(message) = err.server_message() {
        return message.to_string();
    }
    match err.status() {
        Some(401) => "아이디 또는 비밀번호가 올바르지 않습니다.".to_string(),
        _ => "로그인 중 오류가 발생했습니다.".to_string(),
    }
}

/// Body of `POST /api/auth/find-id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindIdQuery {
    pub mb_name: String,
    pub mb_hp: String,
}

impl FindIdQuery {
    pub fn new(mb_name: &str, mb_hp: &str) -> Result<Self, FormError> {
        let mb_name = mb_name.trim();
        if mb_name.is_empty() {
            return Err(FormError::NameRequired);
        }
        Ok(Self {
            mb_name: mb_name.to_string(),
            mb_hp: normalize_phone(mb_hp)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundId {
    pub mb_id: String,
}

pub fn find_id_failure_message(err: &BackendError) -> String {
    match err.status() {
        Some(404) => "일치하는 회원 정보가 없습니다.".to_string(),
        _ => err
            .server_message()
            .unwrap_or("아이디 찾기에 실패했습니다.")
            .to_string(),
    }
}

/// Body of `PUT /api/users/complete-profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCompletion {
    pub mb_nick: String,
    pub mb_email: String,
    pub mb_hp: String,
}

impl ProfileCompletion {
    pub fn new(mb_nick: &str, mb_email: &str, mb_hp: &str) -> Result<Self, FormError> {
        validate_nick(mb_nick)?;
        validate_email(mb_email)?;
        Ok(Self {
            mb_nick: mb_nick.trim().to_string(),
            mb_email: mb_email.trim().to_string(),
            mb_hp: normalize_phone(mb_hp)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            LoginCredentials::new("  ", "pw").unwrap_err(),
            FormError::MissingCredentials
        );
        assert_eq!(
            LoginCredentials::new("user", "").unwrap_err(),
            FormError::MissingCredentials
        );
        assert_eq!(LoginCredentials::new(" user ", "pw").unwrap().mb_id, "user");
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("user_01").is_ok());
        assert_eq!(validate_id("abc"), Err(FormError::InvalidId));
        assert_eq!(validate_id("한글아이디"), Err(FormError::InvalidId));
        assert_eq!(validate_id(&"a".repeat(21)), Err(FormError::InvalidId));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.kr").is_ok());
        assert_eq!(validate_email("ab.kr"), Err(FormError::InvalidEmail));
        assert_eq!(validate_email("@b.kr"), Err(FormError::InvalidEmail));
    }

    #[test]
    fn test_grant_merges_top_level_profile_flag() {
        let json = r#"{"access_token":"t","user":{"mb_id":"u","mb_level":2},"needProfileUpdate":true}"#;
        let grant: LoginGrant = serde_json::from_str(json).unwrap();
        let session = grant.into_session();
        assert!(session.user.need_profile_update);
        assert_eq!(session.access_token, "t");
    }

    #[test]
    fn test_find_id_normalizes_phone() {
        let query = FindIdQuery::new("홍길동", "010-1111-2222").unwrap();
        assert_eq!(query.mb_hp, "01011112222");
    }

    #[test]
    fn test_login_failure_message() {
        let rejected = BackendError::Status {
            status: 401,
            message: None,
        };
        assert_eq!(
            login_failure_message(&rejected),
            "아이디 또는 비밀번호가 올바르지 않습니다."
        );
        let with_message = BackendError::Status {
            status: 403,
            message: Some("탈퇴한 회원입니다.".to_string()),
        };
        assert_eq!(login_failure_message(&with_message), "탈퇴한 회원입니다.");
        assert_eq!(
            login_failure_message(&BackendError::Timeout),
            "로그인 중 오류가 발생했습니다."
        );
    }

    #[test]
    fn test_find_id_not_found() {
        let missing = BackendError::Status {
            status: 404,
            message: Some("not found".to_string()),
        };
        assert_eq!(find_id_failure_message(&missing), "일치하는 회원 정보가 없습니다.");
    }
}
