//! Signup: duplicate checks and the final submission.
//!
//! The draft lives in the flow store so a check result stays tied to the
//! exact value that was checked.

use actix_web::{HttpResponse, web};

use lectern_core::domain::SignupDraft;
use lectern_core::domain::credentials::{validate_id, validate_nick};
use lectern_core::domain::member::mask_id;
use lectern_core::domain::signup::{Availability, signup_failure_message};
use lectern_core::ports::flow_store;
use lectern_shared::dto::{CheckIdForm, CheckNickForm, CheckResult, RedirectResponse, SignupForm};

use crate::flows::{FlowId, FlowKind, SIGNUP_TTL};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load_draft(state: &AppState, flow: &FlowId) -> SignupDraft {
    flow_store::load(state.flows.as_ref(), &flow.key(FlowKind::Signup))
        .await
        .unwrap_or_default()
}

async fn save_draft(state: &AppState, flow: &FlowId, draft: &SignupDraft) -> AppResult<()> {
    flow_store::save(
        state.flows.as_ref(),
        &flow.key(FlowKind::Signup),
        draft,
        SIGNUP_TTL,
    )
    .await?;
    Ok(())
}

fn check_result(availability: Availability, available_msg: &str, taken_msg: &str) -> CheckResult {
    let fallback = if availability.available {
        available_msg
    } else {
        taken_msg
    };
    CheckResult {
        available: availability.available,
        message: availability
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    }
}

/// POST /form/signup/check-id
pub async fn check_id(
    state: web::Data<AppState>,
    flow: FlowId,
    body: web::Json<CheckIdForm>,
) -> AppResult<HttpResponse> {
    let mb_id = body.into_inner().mb_id.trim().to_string();
    validate_id(&mb_id)?;

    let availability = state.backend.check_id(&mb_id).await?;

    let mut draft = load_draft(&state, &flow).await;
    draft.record_id_check(&mb_id, availability.available);
    save_draft(&state, &flow, &draft).await?;

    tracing::debug!(member = %mask_id(&mb_id), available = availability.available, "Id checked");
    Ok(flow.ok(state.cookie_secure).json(check_result(
        availability,
        "사용 가능한 아이디입니다.",
        "이미 사용 중인 아이디입니다.",
    )))
}

/// POST /form/signup/check-nick
pub async fn check_nick(
    state: web::Data<AppState>,
    flow: FlowId,
    body: web::Json<CheckNickForm>,
) -> AppResult<HttpResponse> {
    let mb_nick = body.into_inner().mb_nick.trim().to_string();
    validate_nick(&mb_nick)?;

    let availability = state.backend.check_nick(&mb_nick).await?;

    let mut draft = load_draft(&state, &flow).await;
    draft.record_nick_check(&mb_nick, availability.available);
    save_draft(&state, &flow, &draft).await?;

    Ok(flow.ok(state.cookie_secure).json(check_result(
        availability,
        "사용 가능한 닉네임입니다.",
        "이미 사용 중인 닉네임입니다.",
    )))
}

/// POST /form/signup
///
/// Every local rule is checked before the backend sees anything.
pub async fn submit(
    state: web::Data<AppState>,
    flow: FlowId,
    body: web::Json<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();

    let mut draft = load_draft(&state, &flow).await;
    draft.set_id(&form.mb_id);
    draft.set_nick(&form.mb_nick);
    draft.mb_password = form.mb_password;
    draft.mb_password_confirm = form.mb_password_confirm;
    draft.mb_name = form.mb_name;
    draft.mb_email = form.mb_email;
    draft.mb_hp = form.mb_hp;
    draft.agree_terms = form.agree_terms;
    draft.agree_privacy = form.agree_privacy;

    let submission = match draft.submission() {
        Ok(submission) => submission,
        Err(e) => {
            // Passwords are not kept between attempts
            draft.mb_password.clear();
            draft.mb_password_confirm.clear();
            save_draft(&state, &flow, &draft).await?;
            return Err(e.into());
        }
    };

    state.backend.signup(&submission).await.map_err(|e| {
        tracing::info!(member = %mask_id(&submission.mb_id), status = ?e.status(), "Signup refused");
        AppError::backend(&e, signup_failure_message(&e))
    })?;

    state.flows.remove(&flow.key(FlowKind::Signup)).await?;
    tracing::info!(member = %mask_id(&submission.mb_id), "Signup completed");

    Ok(HttpResponse::Ok().json(RedirectResponse::to("/form/login")))
}
