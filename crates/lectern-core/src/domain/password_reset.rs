//! Find-password flow: `Request -> Verify -> Reset`.
//!
//! Moves are strictly forward on success. The only way back is
//! [`PasswordReset::back_to_start`], and only from `Verify`.

use serde::{Deserialize, Serialize};

use super::credentials::validate_password;
use super::phone::normalize_phone;
use crate::error::{FlowError, FormError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetStage {
    #[default]
    Request,
    Verify,
    Reset,
}

impl ResetStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ResetStage::Request => "request",
            ResetStage::Verify => "verify",
            ResetStage::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordReset {
    stage: ResetStage,
    mb_id: String,
    mb_hp: String,
    reset_token: Option<String>,
}

/// Body of `POST /api/auth/password/sms/request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRequest {
    pub mb_id: String,
    pub mb_hp: String,
}

/// Body of `POST /api/auth/password/sms/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeVerification {
    pub mb_id: String,
    pub mb_hp: String,
    pub code: String,
}

/// Answer of `POST /api/auth/password/sms/verify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifiedCode {
    #[serde(default, rename = "resetToken")]
    pub reset_token: Option<String>,
}

/// Body of `POST /api/auth/password/reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
    #[serde(rename = "resetToken")]
    pub reset_token: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Errors of the find-password pages: bad input or an out-of-order step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResetError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

impl PasswordReset {
    pub fn stage(&self) -> ResetStage {
        self.stage
    }

    pub fn mb_id(&self) -> &str {
        &self.mb_id
    }

    /// Digits of the phone the code was sent to. Empty before a request.
    pub fn mb_hp(&self) -> &str {
        &self.mb_hp
    }

    /// Validate the request form. Allowed from `Request` only.
    pub fn code_request(&self, mb_id: &str, mb_hp: &str) -> Result<CodeRequest, ResetError> {
        if self.stage != ResetStage::Request {
            return Err(FlowError::InvalidRequest.into());
        }
        let mb_id = mb_id.trim();
        if mb_id.is_empty() {
            return Err(FormError::MissingCredentials.into());
        }
        Ok(CodeRequest {
            mb_id: mb_id.to_string(),
            mb_hp: normalize_phone(mb_hp)?,
        })
    }

    /// The backend accepted the request and sent a code.
    pub fn code_sent(&mut self, request: CodeRequest) {
        self.mb_id = request.mb_id;
        self.mb_hp = request.mb_hp;
        self.reset_token = None;
        self.stage = ResetStage::Verify;
    }

    pub fn verification(&self, code: &str) -> Result<CodeVerification, ResetError> {
        if self.stage != ResetStage::Verify {
            return Err(FlowError::InvalidRequest.into());
        }
        let code = code.trim();
        if code.is_empty() {
            return Err(FormError::CodeRequired.into());
        }
        Ok(CodeVerification {
            mb_id: self.mb_id.clone(),
            mb_hp: self.mb_hp.clone(),
            code: code.to_string(),
        })
    }

    /// Advance to `Reset` only when the backend handed back a usable token.
    pub fn code_verified(&mut self, verified: VerifiedCode) -> Result<(), FlowError> {
        if self.stage != ResetStage::Verify {
            return Err(FlowError::InvalidRequest);
        }
        match verified.reset_token {
            Some(token) if !token.trim().is_empty() => {
                self.reset_token = Some(token);
                self.stage = ResetStage::Reset;
                Ok(())
            }
            _ => Err(FlowError::InvalidRequest),
        }
    }

    pub fn password_change(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<PasswordChange, ResetError> {
        let token = match (&self.stage, &self.reset_token) {
            (ResetStage::Reset, Some(token)) if !token.is_empty() => token,
            _ => return Err(FlowError::InvalidRequest.into()),
        };
        validate_password(new_password, confirm_password)?;
        Ok(PasswordChange {
            reset_token: token.clone(),
            new_password: new_password.to_string(),
        })
    }

    pub fn back_to_start(&mut self) -> Result<(), FlowError> {
        if self.stage != ResetStage::Verify {
            return Err(FlowError::InvalidRequest);
        }
        *self = PasswordReset::default();
        Ok(())
    }
}
