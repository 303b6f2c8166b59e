//! `reqwest` client for the backend REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use lectern_core::domain::admin::{DeviceRecord, LevelChange, MemberRow, Page, PaymentRow};
use lectern_core::domain::catalog::{
    Lecture, LectureDraft, LecturePackage, PresignedUpload, SignedUrl, StoredFile,
};
use lectern_core::domain::credentials::{
    FindIdQuery, FoundId, LoginCredentials, LoginGrant, ProfileCompletion,
};
use lectern_core::domain::password_reset::{
    CodeRequest, CodeVerification, PasswordChange, VerifiedCode,
};
use lectern_core::domain::payment::{OrderRequest, PaymentConfirmation, PaymentOrder};
use lectern_core::domain::signup::{Availability, SignupSubmission};
use lectern_core::error::BackendError;
use lectern_core::ports::{AdminBackend, AuthBackend, CatalogBackend, PaymentBackend, QueryPairs};

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Applied to every call when set. Unset means no timeout.
    pub request_timeout: Option<Duration>,
    /// The profile check always has a bound, the header and purchase gate wait on it.
    pub profile_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            request_timeout: None,
            profile_timeout: Duration::from_secs(5),
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        let secs = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        Self {
            base_url: std::env::var("BACKEND_API_URL")
                .unwrap_or_else(|_| "http://localhost:4000".to_string()),
            request_timeout: secs("BACKEND_TIMEOUT_SECS"),
            profile_timeout: secs("PROFILE_TIMEOUT_SECS").unwrap_or(Duration::from_secs(5)),
        }
    }
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BackendError::Network(format!("invalid BACKEND_API_URL: {}", e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Build an endpoint URL; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(segments));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    tracing::warn!(url = ?err.url().map(|u| u.path()), "Backend call failed: {}", err);
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Network(err.to_string())
    }
}

/// Map a non-2xx response, keeping the backend's `message` when it sent JSON.
fn status_error(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message);
    tracing::debug!(status, "Backend answered with an error status");
    BackendError::Status { status, message }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, BackendError> {
        self.send(
            self.request(Method::POST, &["api", "auth", "login"], None)
                .json(credentials),
        )
        .await
    }

    async fn signup(&self, submission: &SignupSubmission) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, &["api", "auth", "signup"], None)
                .json(submission),
        )
        .await
    }

    async fn check_id(&self, mb_id: &str) -> Result<Availability, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "auth", "check-id"], None)
                .query(&[("mb_id", mb_id)]),
        )
        .await
    }

    async fn check_nick(&self, mb_nick: &str) -> Result<Availability, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "auth", "check-nick"], None)
                .query(&[("mb_nick", mb_nick)]),
        )
        .await
    }

    async fn check_token(&self, token: &str) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::GET, &["api", "auth", "profile"], Some(token))
                .timeout(self.config.profile_timeout),
        )
        .await
    }

    async fn find_id(&self, query: &FindIdQuery) -> Result<FoundId, BackendError> {
        self.send(
            self.request(Method::POST, &["api", "auth", "find-id"], None)
                .json(query),
        )
        .await
    }

    async fn request_reset_code(&self, request: &CodeRequest) -> Result<(), BackendError> {
        self.send_empty(
            self.request(
                Method::POST,
                &["api", "auth", "password", "sms", "request"],
                None,
            )
            .json(request),
        )
        .await
    }

    async fn verify_reset_code(
        &self,
        verification: &CodeVerification,
    ) -> Result<VerifiedCode, BackendError> {
        self.send(
            self.request(
                Method::POST,
                &["api", "auth", "password", "sms", "verify"],
                None,
            )
            .json(verification),
        )
        .await
    }

    async fn reset_password(&self, change: &PasswordChange) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, &["api", "auth", "password", "reset"], None)
                .json(change),
        )
        .await
    }

    async fn complete_profile(
        &self,
        token: &str,
        completion: &ProfileCompletion,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(
                Method::PUT,
                &["api", "users", "complete-profile"],
                Some(token),
            )
            .json(completion),
        )
        .await
    }
}

#[async_trait]
impl PaymentBackend for HttpBackend {
    async fn create_order(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<PaymentOrder, BackendError> {
        self.send(
            self.request(Method::POST, &["payments", "order"], Some(token))
                .json(request),
        )
        .await
    }

    async fn confirm_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, &["payments", "confirm"], None)
                .json(confirmation),
        )
        .await
    }
}

#[async_trait]
impl AdminBackend for HttpBackend {
    async fn members(
        &self,
        token: &str,
        query: &QueryPairs,
    ) -> Result<Page<MemberRow>, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "admin", "members"], Some(token))
                .query(query),
        )
        .await
    }

    async fn update_member_level(
        &self,
        token: &str,
        member_id: u64,
        change: &LevelChange,
    ) -> Result<(), BackendError> {
        let id = member_id.to_string();
        self.send_empty(
            self.request(
                Method::PUT,
                &["api", "admin", "members", &id, "level"],
                Some(token),
            )
            .json(change),
        )
        .await
    }

    async fn payments(
        &self,
        token: &str,
        query: &QueryPairs,
    ) -> Result<Page<PaymentRow>, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "admin", "payments"], Some(token))
                .query(query),
        )
        .await
    }

    async fn stats(&self, token: &str) -> Result<serde_json::Value, BackendError> {
        self.send(self.request(Method::GET, &["api", "admin", "stats"], Some(token)))
            .await
    }

    async fn user_stats(&self, token: &str) -> Result<serde_json::Value, BackendError> {
        self.send(self.request(
            Method::GET,
            &["api", "admin", "stats", "users"],
            Some(token),
        ))
        .await
    }

    async fn devices(&self, token: &str, user_id: &str) -> Result<Vec<DeviceRecord>, BackendError> {
        self.send(self.request(
            Method::GET,
            &["api", "admin", "devices", user_id],
            Some(token),
        ))
        .await
    }

    async fn delete_device(
        &self,
        token: &str,
        user_id: &str,
        device_id: &str,
    ) -> Result<(), BackendError> {
        self.send_empty(self.request(
            Method::DELETE,
            &["api", "admin", "devices", user_id, device_id],
            Some(token),
        ))
        .await
    }

    async fn files(&self, token: &str, query: &QueryPairs) -> Result<Vec<StoredFile>, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "files"], Some(token))
                .query(query),
        )
        .await
    }

    async fn presigned_upload(
        &self,
        token: &str,
        query: &QueryPairs,
    ) -> Result<PresignedUpload, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "files", "presigned"], Some(token))
                .query(query),
        )
        .await
    }

    async fn delete_file(&self, token: &str, file_id: u64) -> Result<(), BackendError> {
        let id = file_id.to_string();
        self.send_empty(self.request(Method::DELETE, &["api", "files", &id], Some(token)))
            .await
    }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    async fn lecture_packages(&self) -> Result<Vec<LecturePackage>, BackendError> {
        self.send(self.request(Method::GET, &["api", "lecture-packages"], None))
            .await
    }

    async fn lectures(&self, query: &QueryPairs) -> Result<Vec<Lecture>, BackendError> {
        self.send(
            self.request(Method::GET, &["api", "lectures"], None)
                .query(query),
        )
        .await
    }

    async fn create_lecture(
        &self,
        token: &str,
        draft: &LectureDraft,
    ) -> Result<Lecture, BackendError> {
        self.send(
            self.request(Method::POST, &["api", "lectures"], Some(token))
                .json(draft),
        )
        .await
    }

    async fn update_lecture(
        &self,
        token: &str,
        lecture_id: u64,
        draft: &LectureDraft,
    ) -> Result<Lecture, BackendError> {
        let id = lecture_id.to_string();
        self.send(
            self.request(Method::PATCH, &["api", "lectures", &id], Some(token))
                .json(draft),
        )
        .await
    }

    async fn signed_lecture_url(
        &self,
        token: &str,
        lecture_id: u64,
    ) -> Result<SignedUrl, BackendError> {
        let id = lecture_id.to_string();
        self.send(self.request(
            Method::GET,
            &["api", "signed-urls", "lecture", &id],
            Some(token),
        ))
        .await
    }
}
