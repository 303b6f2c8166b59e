//! Login, logout and the session bootstrap read.

use actix_web::{HttpRequest, HttpResponse, web};

use lectern_core::domain::credentials::{LoginCredentials, login_failure_message};
use lectern_core::domain::member::mask_id;
use lectern_core::domain::{Role, Session};
use lectern_shared::ErrorResponse;
use lectern_shared::dto::{LoginForm, RedirectResponse, SessionView};

use crate::middleware::error::{AppError, AppResult};
use crate::session::{
    SESSION_COOKIE, SessionState, clear_session_cookie, issue_cookie, read_session,
};
use crate::state::AppState;

/// POST /form/login
///
/// Answers `{redirect}`; the page performs a full navigation to it.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    let credentials = LoginCredentials::new(&form.mb_id, &form.mb_password)?;

    let grant = state.backend.login(&credentials).await.map_err(|e| {
        tracing::info!(member = %mask_id(&credentials.mb_id), status = ?e.status(), "Login refused");
        AppError::backend(&e, login_failure_message(&e))
    })?;

    let session = grant.into_session();
    let landing = session.landing();
    tracing::info!(
        member = %mask_id(&session.user.mb_id),
        role = ?session.role(),
        landing = landing.path(),
        "Login succeeded"
    );

    Ok(HttpResponse::Ok()
        .cookie(issue_cookie(&state, &session)?)
        .json(RedirectResponse::to(landing.path())))
}

/// POST /form/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(clear_session_cookie(state.cookie_secure))
        .json(RedirectResponse::to("/"))
}

/// GET /session
///
/// The member as the page may see it. An unreadable cookie is cleared.
pub async fn current_session(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let cookie = req.cookie(SESSION_COOKIE);
    match read_session(cookie.as_ref().map(|c| c.value()), state.sessions.as_ref()) {
        SessionState::Valid(session) => HttpResponse::Ok().json(session_view(&session)),
        SessionState::Invalid => HttpResponse::Unauthorized()
            .cookie(clear_session_cookie(state.cookie_secure))
            .json(ErrorResponse::unauthorized()),
        SessionState::Missing => HttpResponse::Unauthorized().json(ErrorResponse::unauthorized()),
    }
}

pub(crate) fn session_view(session: &Session) -> SessionView {
    let user = &session.user;
    SessionView {
        mb_id: user.mb_id.clone(),
        mb_name: user.mb_name.clone(),
        mb_nick: user.mb_nick.clone(),
        mb_level: user.mb_level,
        role: match session.role() {
            Role::Admin => "admin",
            Role::Member => "member",
        }
        .to_string(),
        need_profile_update: user.need_profile_update,
    }
}
