//! Checkout: order creation for the payment widget and the provider's return pages.

use actix_web::{HttpResponse, http::StatusCode, http::header, web};
use serde::Deserialize;

use lectern_core::domain::member::mask_id;
use lectern_core::domain::payment::{
    OrderRequest, PAYMENT_CONFIRMED, PaymentConfirmation, PaymentFailure, confirm_failure_message,
};
use lectern_shared::dto::{CheckoutPage, CheckoutResponse, OrderForm};

use crate::flows::{CONFIRMED_TTL, confirmed_order_key};
use crate::middleware::error::{AppError, AppResult};
use crate::session::{Authenticated, CurrentSession, login_location};
use crate::state::AppState;

fn plain_text(status: StatusCode, body: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(body.into())
}

/// GET /payments/checkout/{package_id}
pub async fn checkout_page(
    state: web::Data<AppState>,
    CurrentSession(session): CurrentSession,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let package_id = path.into_inner();
    let Some(session) = session else {
        let here = format!("/payments/checkout/{}", package_id);
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, login_location(Some(&here))))
            .finish());
    };

    let package = state
        .backend
        .lecture_packages()
        .await?
        .into_iter()
        .find(|p| p.id == package_id)
        .ok_or_else(|| AppError::NotFound("존재하지 않는 강의 패키지입니다.".to_string()))?;

    Ok(HttpResponse::Ok().json(CheckoutPage {
        package_id,
        title: package.title,
        price: package.price,
        customer_name: session.user.mb_name,
    }))
}

/// POST /payments/order
pub async fn create_order(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    body: web::Json<OrderForm>,
) -> AppResult<HttpResponse> {
    let request = OrderRequest {
        lecture_package_id: body.lecture_package_id,
    };
    let order = state
        .backend
        .create_order(&session.access_token, &request)
        .await?;

    tracing::info!(
        member = %mask_id(&session.user.mb_id),
        order_id = %order.order_id,
        amount = order.amount,
        "Payment order created"
    );

    let base = &state.checkout.public_base_url;
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        order_id: order.order_id,
        amount: order.amount,
        title: order.title,
        client_key: state.checkout.client_key.clone(),
        customer_name: session.user.mb_name,
        success_url: format!("{}/payments/success", base),
        fail_url: format!("{}/payments/fail", base),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessQuery {
    pub payment_key: Option<String>,
    pub order_id: Option<String>,
    pub amount: Option<String>,
}

/// GET /payments/success?paymentKey=&orderId=&amount=
///
/// Confirms once per order. A reload of the same return URL answers from the
/// confirmed-order marker instead of confirming again.
pub async fn payment_success(
    state: web::Data<AppState>,
    query: web::Query<SuccessQuery>,
) -> HttpResponse {
    let confirmation = match PaymentConfirmation::from_return_params(
        query.payment_key.as_deref(),
        query.order_id.as_deref(),
        query.amount.as_deref(),
    ) {
        Ok(confirmation) => confirmation,
        Err(e) => return plain_text(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let marker = confirmed_order_key(&confirmation.order_id);
    if state.flows.get(&marker).await.as_deref() == Some(confirmation.payment_key.as_str()) {
        tracing::debug!(order_id = %confirmation.order_id, "Order already confirmed");
        return plain_text(StatusCode::OK, PAYMENT_CONFIRMED);
    }

    if let Err(e) = state.backend.confirm_payment(&confirmation).await {
        tracing::warn!(order_id = %confirmation.order_id, "Payment confirmation failed: {}", e);
        let status = e
            .status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        return plain_text(status, confirm_failure_message(&e));
    }

    if let Err(e) = state
        .flows
        .put(&marker, &confirmation.payment_key, CONFIRMED_TTL)
        .await
    {
        tracing::warn!(order_id = %confirmation.order_id, "Could not record confirmed order: {}", e);
    }
    tracing::info!(
        order_id = %confirmation.order_id,
        amount = confirmation.amount,
        "Payment confirmed"
    );

    plain_text(StatusCode::OK, PAYMENT_CONFIRMED)
}

/// GET /payments/fail?code=&message=&orderId=
pub async fn payment_fail(query: web::Query<PaymentFailure>) -> HttpResponse {
    let failure = query.into_inner();
    tracing::info!(code = ?failure.code, order_id = ?failure.order_id, "Payment failed at provider");
    plain_text(StatusCode::OK, failure.describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, FakeBackend, session_cookie_for, test_app, test_state};
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn test_success_confirms_with_exact_body() {
        let backend = FakeBackend::default();
        let state = test_state(backend.clone());
        let app = test::init_service(test_app(&state)).await;

        let req = test::TestRequest::get()
            .uri("/payments/success?paymentKey=pk&orderId=o1&amount=1000")
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, PAYMENT_CONFIRMED.as_bytes());

        let sent = serde_json::to_value(backend.last_confirmation().unwrap()).unwrap();
        assert_eq!(sent, json!({"paymentKey": "pk", "orderId": "o1", "amount": 1000}));
    }

    #[actix_web::test]
    async fn test_reload_does_not_confirm_twice() {
        let backend = FakeBackend::default();
        let state = test_state(backend.clone());
        let app = test::init_service(test_app(&state)).await;

        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/payments/success?paymentKey=pk&orderId=o1&amount=1000")
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status().as_u16(), 200);
        }
        let confirms = backend
            .calls()
            .into_iter()
            .filter(|c| *c == Call::ConfirmPayment)
            .count();
        assert_eq!(confirms, 1);
    }

    #[actix_web::test]
    async fn test_bad_params_skip_network() {
        let backend = FakeBackend::default();
        let state = test_state(backend.clone());
        let app = test::init_service(test_app(&state)).await;

        for uri in [
            "/payments/success?orderId=o1&amount=1000",
            "/payments/success?paymentKey=pk&orderId=o1&amount=ten",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status().as_u16(), 400);
            let body = test::read_body(res).await;
            assert_eq!(body, "결제 정보가 올바르지 않습니다.".as_bytes());
        }
        assert!(backend.calls().is_empty());
    }

    #[actix_web::test]
    async fn test_backend_rejection_is_shown() {
        let backend = FakeBackend::default().with_confirm_error(400, Some("이미 처리된 결제입니다."));
        let state = test_state(backend);
        let app = test::init_service(test_app(&state)).await;
        let req = test::TestRequest::get()
            .uri("/payments/success?paymentKey=pk&orderId=o1&amount=1000")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
        assert_eq!(test::read_body(res).await, "이미 처리된 결제입니다.".as_bytes());
    }

    #[actix_web::test]
    async fn test_order_hands_widget_everything() {
        let state = test_state(FakeBackend::default());
        let app = test::init_service(test_app(&state)).await;
        let req = test::TestRequest::post()
            .uri("/payments/order")
            .cookie(session_cookie_for(&state, 2, false))
            .set_json(json!({"lecturePackageId": 3}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["orderId"], "order-3");
        assert_eq!(body["clientKey"], "test_ck");
        assert_eq!(body["successUrl"], "http://localhost:8080/payments/success");
        assert_eq!(body["failUrl"], "http://localhost:8080/payments/fail");
    }

    #[actix_web::test]
    async fn test_fail_page_shows_provider_message() {
        let state = test_state(FakeBackend::default());
        let app = test::init_service(test_app(&state)).await;
        let req = test::TestRequest::get()
            .uri("/payments/fail?code=PAY_PROCESS_CANCELED&message=%EC%B7%A8%EC%86%8C&orderId=o1")
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "취소 (PAY_PROCESS_CANCELED)".as_bytes());
    }
}
