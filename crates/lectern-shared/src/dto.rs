//! Data Transfer Objects - request/response bodies of the gateway's own routes.

use serde::{Deserialize, Serialize};

/// `POST /form/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub mb_id: String,
    pub mb_password: String,
}

/// Answer of every form that ends in a full page navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub redirect: String,
}

impl RedirectResponse {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            redirect: path.into(),
        }
    }
}

/// `GET /session`. The bearer token never leaves the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub mb_id: String,
    pub mb_name: String,
    pub mb_nick: String,
    pub mb_level: u8,
    pub role: String,
    pub need_profile_update: bool,
}

/// `POST /form/signup`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub mb_id: String,
    pub mb_password: String,
    pub mb_password_confirm: String,
    pub mb_name: String,
    pub mb_nick: String,
    pub mb_email: String,
    pub mb_hp: String,
    pub agree_terms: bool,
    pub agree_privacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIdForm {
    pub mb_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckNickForm {
    pub mb_nick: String,
}

/// Answer of the duplicate checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub available: bool,
    pub message: String,
}

/// `POST /form/find-id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindIdForm {
    pub mb_name: String,
    pub mb_hp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindIdResult {
    pub mb_id: String,
}

/// `POST /form/find-password/request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequestForm {
    pub mb_id: String,
    pub mb_hp: String,
}

/// `POST /form/find-password/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeForm {
    pub code: String,
}

/// `POST /form/find-password/reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPasswordForm {
    pub new_password: String,
    pub confirm_password: String,
}

/// Current stage of the find-password flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResponse {
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Number the code went to, as `010-1234-5678`. Only while verifying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mb_hp: Option<String>,
}

/// `PUT /form/complete-profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteProfileForm {
    pub mb_nick: String,
    pub mb_email: String,
    pub mb_hp: String,
}

/// `POST /payments/order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub lecture_package_id: u64,
}

/// `GET /payments/checkout/{package_id}`: what the checkout page shows before ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPage {
    pub package_id: u64,
    pub title: String,
    pub price: u64,
    pub customer_name: String,
}

/// Everything the payment widget needs to open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub amount: u64,
    pub title: String,
    pub client_key: String,
    pub customer_name: String,
    pub success_url: String,
    pub fail_url: String,
}

/// `PUT /admin/api/members/{id}/level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelForm {
    pub mb_level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
