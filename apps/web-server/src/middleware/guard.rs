//! Role guard: composed once around a scope, runs before any of its handlers.

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
    web,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use lectern_core::domain::{AccessDenied, Authorize, Role, member::mask_id};

use crate::session::{SESSION_COOKIE, SessionState, clear_session_cookie, login_location, read_session};
use crate::state::AppState;

/// Redirects visitors below `min` away from the wrapped scope.
///
/// - no or unreadable session: `303` to the login page, unreadable cookie cleared
/// - role too low: `303` to `/`
pub struct RequireRole {
    min: Role,
}

impl RequireRole {
    pub fn new(min: Role) -> Self {
        Self { min }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            min: self.min,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    min: Role,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            let (http_req, _payload) = req.into_parts();
            let response = HttpResponse::InternalServerError().finish();
            return Box::pin(async move {
                Ok(ServiceResponse::new(http_req, response).map_into_right_body())
            });
        };

        let cookie = req.cookie(SESSION_COOKIE);
        let session_state = read_session(cookie.as_ref().map(|c| c.value()), state.sessions.as_ref());
        let unreadable = matches!(session_state, SessionState::Invalid);
        let session = session_state.into_session();

        let denied = match session.require_role(self.min) {
            Ok(granted) => {
                tracing::debug!(member = %mask_id(&granted.user.mb_id), "Role check passed");
                None
            }
            Err(AccessDenied::NotAuthenticated) => {
                let target = match req.query_string() {
                    "" => req.path().to_string(),
                    query => format!("{}?{}", req.path(), query),
                };
                let mut response = HttpResponse::SeeOther();
                response.insert_header((header::LOCATION, login_location(Some(&target))));
                if unreadable {
                    response.cookie(clear_session_cookie(state.cookie_secure));
                }
                Some(response.finish())
            }
            Err(AccessDenied::InsufficientRole) => {
                tracing::warn!(path = %req.path(), "Role below {:?}, sending home", self.min);
                Some(
                    HttpResponse::SeeOther()
                        .insert_header((header::LOCATION, "/"))
                        .finish(),
                )
            }
        };

        if let Some(response) = denied {
            let (http_req, _payload) = req.into_parts();
            return Box::pin(async move {
                Ok(ServiceResponse::new(http_req, response).map_into_right_body())
            });
        }

        if let Some(session) = session {
            req.extensions_mut().insert(session);
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
