//! Complete-profile gate for accounts created without nickname or contact details.

use actix_web::{HttpResponse, web};

use lectern_core::domain::credentials::ProfileCompletion;
use lectern_core::domain::member::mask_id;
use lectern_shared::dto::{CompleteProfileForm, RedirectResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::session::{Authenticated, issue_cookie};
use crate::state::AppState;

/// PUT /form/complete-profile
///
/// Re-issues the session cookie with the flag cleared and redirects like a login.
pub async fn complete_profile(
    state: web::Data<AppState>,
    Authenticated(mut session): Authenticated,
    body: web::Json<CompleteProfileForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    let completion = ProfileCompletion::new(&form.mb_nick, &form.mb_email, &form.mb_hp)?;

    if let Err(e) = state
        .backend
        .complete_profile(&session.access_token, &completion)
        .await
    {
        let message = e
            .server_message()
            .unwrap_or("프로필 저장에 실패했습니다.")
            .to_string();
        return Err(AppError::backend(&e, message));
    }

    session.user.mb_nick = completion.mb_nick;
    session.user.need_profile_update = false;
    tracing::info!(member = %mask_id(&session.user.mb_id), "Profile completed");

    Ok(HttpResponse::Ok()
        .cookie(issue_cookie(&state, &session)?)
        .json(RedirectResponse::to(session.landing().path())))
}
