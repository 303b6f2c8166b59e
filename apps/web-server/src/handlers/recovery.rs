//! Find-id and the three-stage find-password flow.

use actix_web::{HttpResponse, web};

use lectern_core::FlowError;
use lectern_core::domain::credentials::{FindIdQuery, find_id_failure_message};
use lectern_core::domain::member::mask_id;
use lectern_core::domain::phone::format_phone_number;
use lectern_core::domain::{PasswordReset, ResetStage};
use lectern_core::ports::flow_store;
use lectern_shared::dto::{
    FindIdForm, FindIdResult, NewPasswordForm, RedirectResponse, ResetRequestForm, StageResponse,
    VerifyCodeForm,
};

use crate::flows::{FlowId, FlowKind, RESET_TTL};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn stage_response(reset: &PasswordReset, message: Option<&str>) -> StageResponse {
    let mb_hp = (reset.stage() == ResetStage::Verify).then(|| format_phone_number(reset.mb_hp()));
    StageResponse {
        stage: reset.stage().as_str().to_string(),
        message: message.map(String::from),
        mb_hp,
    }
}

async fn load_reset(state: &AppState, flow: &FlowId) -> Option<PasswordReset> {
    flow_store::load(state.flows.as_ref(), &flow.key(FlowKind::PasswordReset)).await
}

/// A flow past its first stage must still be in the store.
async fn require_reset(state: &AppState, flow: &FlowId) -> Result<PasswordReset, AppError> {
    load_reset(state, flow)
        .await
        .ok_or_else(|| FlowError::Expired.into())
}

async fn save_reset(state: &AppState, flow: &FlowId, reset: &PasswordReset) -> AppResult<()> {
    flow_store::save(
        state.flows.as_ref(),
        &flow.key(FlowKind::PasswordReset),
        reset,
        RESET_TTL,
    )
    .await?;
    Ok(())
}

/// POST /form/find-id
pub async fn find_id(
    state: web::Data<AppState>,
    body: web::Json<FindIdForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    let query = FindIdQuery::new(&form.mb_name, &form.mb_hp)?;

    let found = state
        .backend
        .find_id(&query)
        .await
        .map_err(|e| AppError::backend(&e, find_id_failure_message(&e)))?;

    Ok(HttpResponse::Ok().json(FindIdResult { mb_id: found.mb_id }))
}

/// GET /form/find-password
pub async fn reset_status(state: web::Data<AppState>, flow: FlowId) -> HttpResponse {
    let reset = load_reset(&state, &flow).await.unwrap_or_default();
    flow.ok(state.cookie_secure).json(stage_response(&reset, None))
}

/// POST /form/find-password/request
pub async fn request_code(
    state: web::Data<AppState>,
    flow: FlowId,
    body: web::Json<ResetRequestForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    let mut reset = load_reset(&state, &flow).await.unwrap_or_default();
    let request = reset.code_request(&form.mb_id, &form.mb_hp)?;

    state.backend.request_reset_code(&request).await.map_err(|e| {
        let message = e
            .server_message()
            .unwrap_or("인증번호 발송에 실패했습니다.")
            .to_string();
        AppError::backend(&e, message)
    })?;

    tracing::info!(member = %mask_id(&request.mb_id), "Reset code sent");
    reset.code_sent(request);
    save_reset(&state, &flow, &reset).await?;

    Ok(flow.ok(state.cookie_secure).json(stage_response(
        &reset,
        Some("인증번호가 발송되었습니다."),
    )))
}

/// POST /form/find-password/verify
pub async fn verify_code(
    state: web::Data<AppState>,
    flow: FlowId,
    body: web::Json<VerifyCodeForm>,
) -> AppResult<HttpResponse> {
    let mut reset = require_reset(&state, &flow).await?;
    let verification = reset.verification(&body.code)?;

    let verified = state
        .backend
        .verify_reset_code(&verification)
        .await
        .map_err(|e| {
            let message = e
                .server_message()
                .unwrap_or("인증번호가 올바르지 않습니다.")
                .to_string();
            AppError::backend(&e, message)
        })?;

    reset.code_verified(verified)?;
    save_reset(&state, &flow, &reset).await?;
    tracing::info!(member = %mask_id(reset.mb_id()), "Reset code verified");

    Ok(flow.ok(state.cookie_secure).json(stage_response(&reset, None)))
}

/// POST /form/find-password/reset
pub async fn reset_password(
    state: web::Data<AppState>,
    flow: FlowId,
    body: web::Json<NewPasswordForm>,
) -> AppResult<HttpResponse> {
    let reset = require_reset(&state, &flow).await?;
    let change = reset.password_change(&body.new_password, &body.confirm_password)?;

    let outcome = state.backend.reset_password(&change).await;

    // Dropped on failure too: the next visit starts again at Request
    if let Err(e) = state.flows.remove(&flow.key(FlowKind::PasswordReset)).await {
        tracing::warn!("Failed to drop reset flow: {}", e);
    }

    outcome.map_err(|e| {
        tracing::info!(member = %mask_id(reset.mb_id()), "Password reset refused: {}", e);
        let message = e
            .server_message()
            .unwrap_or("비밀번호 변경에 실패했습니다.")
            .to_string();
        AppError::backend(&e, message)
    })?;
    tracing::info!(member = %mask_id(reset.mb_id()), "Password reset");

    Ok(HttpResponse::Ok().json(RedirectResponse::to("/form/login")))
}

/// POST /form/find-password/restart
pub async fn restart(state: web::Data<AppState>, flow: FlowId) -> AppResult<HttpResponse> {
    let mut reset = require_reset(&state, &flow).await?;
    reset.back_to_start()?;
    save_reset(&state, &flow, &reset).await?;
    Ok(flow.ok(state.cookie_secure).json(stage_response(&reset, None)))
}
