//! Per-browser flow id: keys the multi-step form state in the flow store.

use actix_web::cookie::Cookie;
use actix_web::{FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder, dev::Payload};
use std::future::{Ready, ready};
use std::time::Duration;
use uuid::Uuid;

use crate::session::site_cookie;

pub const FLOW_COOKIE: &str = "flow";

pub const SIGNUP_TTL: Duration = Duration::from_secs(30 * 60);
pub const RESET_TTL: Duration = Duration::from_secs(10 * 60);
pub const CONFIRMED_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Flow store namespaces.
#[derive(Debug, Clone, Copy)]
pub enum FlowKind {
    Signup,
    PasswordReset,
}

impl FlowKind {
    fn prefix(self) -> &'static str {
        match self {
            FlowKind::Signup => "signup",
            FlowKind::PasswordReset => "reset",
        }
    }
}

/// Flow store key of a confirmed payment order.
pub fn confirmed_order_key(order_id: &str) -> String {
    format!("payment:confirmed:{}", order_id)
}

/// Read from the `flow` cookie, or freshly generated when absent.
#[derive(Debug, Clone)]
pub struct FlowId {
    id: Uuid,
    fresh: bool,
}

impl FlowId {
    pub fn key(&self, kind: FlowKind) -> String {
        format!("{}:{}", kind.prefix(), self.id)
    }

    /// Cookie to set on the response. Only needed when the id is new.
    pub fn cookie(&self, secure: bool) -> Option<Cookie<'static>> {
        self.fresh
            .then(|| site_cookie(FLOW_COOKIE, self.id.to_string(), secure))
    }

    /// `200 OK` carrying the flow cookie when it is new.
    pub fn ok(&self, secure: bool) -> HttpResponseBuilder {
        let mut builder = HttpResponse::Ok();
        if let Some(cookie) = self.cookie(secure) {
            builder.cookie(cookie);
        }
        builder
    }
}

impl FromRequest for FlowId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let existing = req
            .cookie(FLOW_COOKIE)
            .and_then(|c| Uuid::parse_str(c.value()).ok());

        let flow = match existing {
            Some(id) => FlowId { id, fresh: false },
            None => FlowId {
                id: Uuid::new_v4(),
                fresh: true,
            },
        };
        ready(Ok(flow))
    }
}
