//! Checkout order and the redirect-and-reconcile confirmation step.

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, FormError};

pub const PAYMENT_CONFIRMED: &str = "결제가 정상적으로 완료되었습니다.";

/// Body of `POST /payments/order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(rename = "lecturePackageId")]
    pub lecture_package_id: u64,
}

/// Order created by the backend, handed to the payment widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: u64,
    pub title: String,
}

/// Body of `POST /payments/confirm`, rebuilt from the provider's return URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub payment_key: String,
    pub order_id: String,
    pub amount: u64,
}

impl PaymentConfirmation {
    /// All three parameters are required and `amount` must be a positive integer.
    pub fn from_return_params(
        payment_key: Option<&str>,
        order_id: Option<&str>,
        amount: Option<&str>,
    ) -> Result<Self, FormError> {
        let present = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let payment_key = present(payment_key).ok_or(FormError::InvalidPaymentParams)?;
        let order_id = present(order_id).ok_or(FormError::InvalidPaymentParams)?;
        let amount = present(amount)
            .and_then(|a| a.parse::<u64>().ok())
            .filter(|a| *a > 0)
            .ok_or(FormError::InvalidPaymentParams)?;

        Ok(Self {
            payment_key,
            order_id,
            amount,
        })
    }
}

/// Query of the provider's fail redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailure {
    pub code: Option<String>,
    pub message: Option<String>,
    pub order_id: Option<String>,
}

impl PaymentFailure {
    pub fn describe(&self) -> String {
        let message = self
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("결제가 취소되었거나 실패했습니다.");
        match &self.code {
            Some(code) if !code.is_empty() => format!("{} ({})", message, code),
            _ => message.to_string(),
        }
    }
}

pub fn confirm_failure_message(err: &BackendError) -> String {
    err.server_message()
        .map(String::from)
        .unwrap_or_else(|| match err.status() {
            Some(status) => format!("결제 승인에 실패했습니다. (HTTP {})", status),
            None => "결제 승인 중 서버 오류가 발생했습니다.".to_string(),
        })
}
