//! Rate limiting middleware for the credential forms.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use lectern_shared::ErrorResponse;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use lectern_core::ports::RateLimiter;

/// Rate limiting middleware factory. Passes everything through without a limiter.
pub struct RateLimitMiddleware {
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy: bool,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        Self {
            limiter,
            trust_proxy: false,
        }
    }

    /// Key on `Forwarded` / `X-Forwarded-For` instead of the socket peer.
    /// Only safe behind a proxy that overwrites those headers.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }
}

/// Client part of the limiter key.
fn client_addr(req: &ServiceRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy: self.trust_proxy,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let Some(limiter) = self.limiter.clone() else {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        };

        // One bucket per client and form
        let key = format!("{}|{}", client_addr(&req, self.trust_proxy), req.path());

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    let retry_after = result.retry_after.as_secs().max(1);
                    tracing::warn!(key = %key, retry_after, "Rate limit exceeded");

                    let error = ErrorResponse::new(
                        429,
                        "Too Many Requests",
                        format!("요청이 너무 많습니다. {}초 후 다시 시도해주세요.", retry_after),
                    );
                    let response = HttpResponse::TooManyRequests()
                        .insert_header((header::RETRY_AFTER, retry_after.to_string()))
                        .json(error);

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Ok(_) => Ok(service.call(req).await?.map_into_left_body()),
                Err(e) => {
                    tracing::error!("Rate limiter error, failing open: {}", e);
                    Ok(service.call(req).await?.map_into_left_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};
    use async_trait::async_trait;
    use lectern_core::ports::{RateLimitError, RateLimitResult};
    use std::time::Duration;

    struct Deny;

    #[async_trait]
    impl RateLimiter for Deny {
        async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
            Ok(RateLimitResult {
                allowed: false,
                retry_after: Duration::from_secs(7),
            })
        }
    }

    struct Broken;

    /// Records the keys it was asked about.
    #[derive(Default)]
    struct Keys(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl RateLimiter for Keys {
        async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
            self.0.lock().unwrap().push(key.to_string());
            Ok(RateLimitResult {
                allowed: true,
                retry_after: Duration::ZERO,
            })
        }
    }

    async fn key_for(trust_proxy: bool) -> String {
        let keys = Arc::new(Keys::default());
        let limiter: Arc<dyn RateLimiter> = keys.clone();
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(Some(limiter)).trust_proxy(trust_proxy))
                .route("/form/login", web::post().to(|| async { "ok" })),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/form/login")
            .peer_addr("192.0.2.10:5000".parse().unwrap())
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        test::call_service(&app, req).await;
        let recorded = keys.0.lock().unwrap().clone();
        recorded.into_iter().next().unwrap()
    }

    #[async_trait]
    impl RateLimiter for Broken {
        async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
            Err(RateLimitError::Backend("down".to_string()))
        }
    }

    async fn status_with(limiter: Option<Arc<dyn RateLimiter>>) -> (u16, Option<String>) {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter))
                .route("/form/login", web::post().to(|| async { "ok" })),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::post().uri("/form/login").to_request()).await;
        let retry_after = res
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        (res.status().as_u16(), retry_after)
    }

    #[actix_web::test]
    async fn test_denied_request_gets_429() {
        assert_eq!(status_with(Some(Arc::new(Deny))).await, (429, Some("7".to_string())));
    }

    #[actix_web::test]
    async fn test_limiter_failure_fails_open() {
        assert_eq!(status_with(Some(Arc::new(Broken))).await.0, 200);
    }

    #[actix_web::test]
    async fn test_no_limiter_passes_through() {
        assert_eq!(status_with(None).await.0, 200);
    }

    #[actix_web::test]
    async fn test_forwarded_header_ignored_by_default() {
        assert_eq!(key_for(false).await, "192.0.2.10|/form/login");
    }

    #[actix_web::test]
    async fn test_forwarded_header_used_behind_trusted_proxy() {
        assert_eq!(key_for(true).await, "203.0.113.7|/form/login");
    }
}
