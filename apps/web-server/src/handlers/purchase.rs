//! Purchase gate: `/purchase/{id}` re-validates the session before checkout.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;

use lectern_core::domain::member::mask_id;
use lectern_core::domain::purchase::{GateOutcome, decide};

use crate::middleware::error::{AppError, AppResult};
use crate::session::{SESSION_COOKIE, SessionState, clear_session_cookie, login_location, read_session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GateQuery {
    pub return_to: Option<String>,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn to_login(state: &AppState, return_to: &str, clear_cookie: bool) -> HttpResponse {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, login_location(Some(return_to))));
    if clear_cookie {
        response.cookie(clear_session_cookie(state.cookie_secure));
    }
    response.finish()
}

/// GET /purchase/{package_id}?return_to=
///
/// Holding a cookie is not enough: the backend must still accept its token.
/// A second click while the check runs is refused.
pub async fn purchase_gate(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<GateQuery>,
) -> AppResult<HttpResponse> {
    let package_id = path.into_inner();
    let fallback = format!("/purchase/{}", package_id);
    let return_to = query.return_to.as_deref().unwrap_or(&fallback);

    let cookie = req.cookie(SESSION_COOKIE);
    let session = match read_session(cookie.as_ref().map(|c| c.value()), state.sessions.as_ref()) {
        SessionState::Valid(session) => session,
        SessionState::Invalid => return Ok(to_login(&state, return_to, true)),
        SessionState::Missing => return Ok(to_login(&state, return_to, false)),
    };

    let Some(_guard) = state.in_flight.try_acquire(&session.user.mb_id) else {
        return Err(AppError::Conflict("이미 확인 중입니다.".to_string()));
    };

    let accepted = state.backend.check_token(&session.access_token).await;
    if let Err(e) = &accepted {
        tracing::info!(
            member = %mask_id(&session.user.mb_id),
            package_id,
            "Session rejected at purchase gate: {}",
            e
        );
    }

    Ok(match decide(package_id, accepted) {
        GateOutcome::Checkout { path } => see_other(&path),
        GateOutcome::Login => to_login(&state, return_to, true),
    })
}
