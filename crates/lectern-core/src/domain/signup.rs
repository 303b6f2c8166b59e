//! Signup draft: field values, uniqueness check state and consents.

use serde::{Deserialize, Serialize};

use super::credentials::{validate_email, validate_id, validate_nick, validate_password};
use super::phone::normalize_phone;
use crate::error::{BackendError, FormError};

/// Outcome of a uniqueness round trip, tied to the value that was checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum UniqueCheck {
    #[default]
    Unchecked,
    Available(String),
    Taken(String),
}

impl UniqueCheck {
    fn for_result(value: &str, available: bool) -> Self {
        if available {
            UniqueCheck::Available(value.to_string())
        } else {
            UniqueCheck::Taken(value.to_string())
        }
    }

    fn checked_value(&self) -> Option<&str> {
        match self {
            UniqueCheck::Unchecked => None,
            UniqueCheck::Available(v) | UniqueCheck::Taken(v) => Some(v),
        }
    }

    /// Drop the result once the field no longer holds the checked value.
    fn invalidate_unless(&mut self, current: &str) {
        if self.checked_value().is_some_and(|v| v != current) {
            *self = UniqueCheck::Unchecked;
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, UniqueCheck::Available(_))
    }
}

/// Everything the signup page holds between round trips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupDraft {
    pub mb_id: String,
    pub mb_password: String,
    pub mb_password_confirm: String,
    pub mb_name: String,
    pub mb_nick: String,
    pub mb_email: String,
    pub mb_hp: String,
    pub agree_terms: bool,
    pub agree_privacy: bool,
    pub id_check: UniqueCheck,
    pub nick_check: UniqueCheck,
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupSubmission {
    pub mb_id: String,
    pub mb_password: String,
    pub mb_name: String,
    pub mb_nick: String,
    pub mb_email: String,
    pub mb_hp: String,
}

impl SignupDraft {
    pub fn set_id(&mut self, mb_id: &str) {
        self.mb_id = mb_id.trim().to_string();
        self.id_check.invalidate_unless(&self.mb_id);
    }

    pub fn set_nick(&mut self, mb_nick: &str) {
        self.mb_nick = mb_nick.trim().to_string();
        self.nick_check.invalidate_unless(&self.mb_nick);
    }

    /// Record an id availability answer for the value currently in the field.
    pub fn record_id_check(&mut self, mb_id: &str, available: bool) {
        self.set_id(mb_id);
        self.id_check = UniqueCheck::for_result(&self.mb_id, available);
    }

    pub fn record_nick_check(&mut self, mb_nick: &str, available: bool) {
        self.set_nick(mb_nick);
        self.nick_check = UniqueCheck::for_result(&self.mb_nick, available);
    }

    /// Validate in display order and build the backend payload.
    pub fn submission(&self) -> Result<SignupSubmission, FormError> {
        validate_id(&self.mb_id)?;
        validate_password(&self.mb_password, &self.mb_password_confirm)?;
        if self.mb_name.trim().is_empty() {
            return Err(FormError::NameRequired);
        }
        validate_nick(&self.mb_nick)?;
        validate_email(&self.mb_email)?;
        let mb_hp = normalize_phone(&self.mb_hp)?;

        match &self.id_check {
            UniqueCheck::Available(_) => {}
            UniqueCheck::Taken(_) => return Err(FormError::IdTaken),
            UniqueCheck::Unchecked => return Err(FormError::IdNotChecked),
        }
        match &self.nick_check {
            UniqueCheck::Available(_) => {}
            UniqueCheck::Taken(_) => return Err(FormError::NickTaken),
            UniqueCheck::Unchecked => return Err(FormError::NickNotChecked),
        }
        if !self.agree_terms {
            return Err(FormError::TermsNotAccepted);
        }
        if !self.agree_privacy {
            return Err(FormError::PrivacyNotAccepted);
        }

        Ok(SignupSubmission {
            mb_id: self.mb_id.clone(),
            mb_password: self.mb_password.clone(),
            mb_name: self.mb_name.trim().to_string(),
            mb_nick: self.mb_nick.clone(),
            mb_email: self.mb_email.trim().to_string(),
            mb_hp,
        })
    }
}

/// Answer of the check-id / check-nick endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// User-facing message for a failed signup call.
pub fn signup_failure_message(err: &BackendError) -> String {
    match err.status() {
        Some(409) => FormError::IdTaken.to_string(),
        Some(400) => err
            .server_message()
            .unwrap_or("입력값을 확인해주세요.")
            .to_string(),
        Some(500) | None => "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.".to_string(),
        Some(_) => err
            .server_message()
            .unwrap_or("회원가입에 실패했습니다.")
            .to_string(),
    }
}
