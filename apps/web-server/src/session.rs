//! Session cookie handling and extractors.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use lectern_core::domain::Session;
use lectern_core::ports::SessionCodec;

use crate::middleware::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// What the `session` cookie holds for this request.
#[derive(Debug)]
pub enum SessionState {
    Missing,
    /// Present but unreadable, expired or forged. Treated as logged out.
    Invalid,
    Valid(Session),
}

impl SessionState {
    pub fn into_session(self) -> Option<Session> {
        match self {
            SessionState::Valid(session) => Some(session),
            _ => None,
        }
    }
}

pub fn read_session(cookie_value: Option<&str>, codec: &dyn SessionCodec) -> SessionState {
    let Some(value) = cookie_value.filter(|v| !v.is_empty()) else {
        return SessionState::Missing;
    };
    match codec.verify(value) {
        Ok(session) => SessionState::Valid(session),
        Err(e) => {
            tracing::debug!("Discarding session cookie: {}", e);
            SessionState::Invalid
        }
    }
}

/// Build an HttpOnly cookie scoped to the whole site.
pub fn site_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish()
}

pub fn session_cookie(token: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = site_cookie(SESSION_COOKIE, token, secure);
    cookie.set_max_age(Duration::seconds(max_age_seconds));
    cookie
}

pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = site_cookie(SESSION_COOKIE, String::new(), secure);
    cookie.make_removal();
    cookie
}

/// Issue a fresh cookie for `session`.
pub fn issue_cookie(state: &AppState, session: &Session) -> Result<Cookie<'static>, AppError> {
    let token = state
        .sessions
        .issue(session)
        .map_err(|e| AppError::Internal(format!("session signing: {}", e)))?;
    Ok(session_cookie(
        token,
        state.sessions.lifetime_seconds(),
        state.cookie_secure,
    ))
}

/// `/form/login?redirect=<return_to>`. Only same-site paths survive.
pub fn login_location(return_to: Option<&str>) -> String {
    match return_to.filter(|path| is_local_path(path)) {
        Some(path) => {
            let pairs: &[(&str, &str)] = &[("redirect", path)];
            let query = serde_urlencoded::to_string(pairs).unwrap_or_default();
            format!("/form/login?{}", query)
        }
        None => "/form/login".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

fn session_from_request(req: &HttpRequest) -> SessionState {
    if let Some(session) = req.extensions().get::<Session>() {
        return SessionState::Valid(session.clone());
    }
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return SessionState::Missing;
    };
    let cookie = req.cookie(SESSION_COOKIE);
    read_session(cookie.as_ref().map(|c| c.value()), state.sessions.as_ref())
}

/// Session if the browser has a valid one. Never fails.
pub struct CurrentSession(pub Option<Session>);

impl FromRequest for CurrentSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(CurrentSession(
            session_from_request(req).into_session(),
        )))
    }
}

/// Session required. Answers 401 otherwise.
///
/// Prefers the session the admin guard already decoded.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            session_from_request(req)
                .into_session()
                .map(Authenticated)
                .ok_or(AppError::Unauthorized),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_location_keeps_local_paths() {
        assert_eq!(
            login_location(Some("/purchase/3?x=1")),
            "/form/login?redirect=%2Fpurchase%2F3%3Fx%3D1"
        );
        assert_eq!(login_location(None), "/form/login");
    }

    #[test]
    fn test_login_location_drops_foreign_targets() {
        assert_eq!(login_location(Some("https://evil.example")), "/form/login");
        assert_eq!(login_location(Some("//evil.example")), "/form/login");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), 3600, true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
    }

    #[test]
    fn test_clear_cookie_expires() {
        let cookie = clear_session_cookie(false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
