//! Handler test helpers: a recording fake backend and a ready-made state.

use actix_web::cookie::Cookie;
use actix_web::{App, web};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

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
use lectern_core::domain::purchase::InFlightRegistry;
use lectern_core::domain::signup::{Availability, SignupSubmission};
use lectern_core::domain::{Session, SessionUser};
use lectern_core::error::BackendError;
use lectern_core::ports::{
    AdminBackend, AuthBackend, CatalogBackend, PaymentBackend, QueryPairs,
};
use lectern_infra::{InMemoryFlowStore, JwtSessionCodec, SessionConfig};

use crate::config::CheckoutConfig;
use crate::session::session_cookie;
use crate::state::AppState;

/// Backend calls, in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login,
    Signup,
    CheckId,
    CheckNick,
    CheckToken,
    FindId,
    RequestResetCode,
    VerifyResetCode,
    ResetPassword,
    CompleteProfile,
    CreateOrder,
    ConfirmPayment,
    Admin(&'static str),
    Catalog(&'static str),
}

#[derive(Default)]
struct Recorded {
    calls: Vec<Call>,
    last_token: Option<String>,
    last_signup: Option<SignupSubmission>,
    last_password_change: Option<PasswordChange>,
    last_confirmation: Option<PaymentConfirmation>,
}

#[derive(Clone)]
pub struct FakeBackend {
    login: Result<LoginGrant, BackendError>,
    id_available: bool,
    signup_status: Option<u16>,
    find_id_status: Option<u16>,
    reset_token: Option<String>,
    profile_status: Option<u16>,
    profile_delay: Option<Duration>,
    confirm_error: Option<BackendError>,
    reset_error: Option<BackendError>,
    signed_url_status: Option<u16>,
    recorded: Arc<Mutex<Recorded>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            login: Ok(grant(1, false)),
            id_available: true,
            signup_status: None,
            find_id_status: None,
            reset_token: Some("rt-test".to_string()),
            profile_status: None,
            profile_delay: None,
            confirm_error: None,
            reset_error: None,
            signed_url_status: None,
            recorded: Arc::default(),
        }
    }
}

pub fn grant(level: u8, need_profile_update: bool) -> LoginGrant {
    LoginGrant {
        access_token: format!("token-{}", level),
        user: user(level, need_profile_update),
        need_profile_update: false,
    }
}

fn user(level: u8, need_profile_update: bool) -> SessionUser {
    SessionUser {
        mb_id: "member01".to_string(),
        mb_name: "홍길동".to_string(),
        mb_nick: "gildong".to_string(),
        mb_level: level,
        need_profile_update,
    }
}

impl FakeBackend {
    pub fn status(status: u16, message: Option<&str>) -> BackendError {
        BackendError::Status {
            status,
            message: message.map(String::from),
        }
    }

    pub fn with_login(mut self, result: Result<LoginGrant, BackendError>) -> Self {
        self.login = result;
        self
    }

    pub fn with_id_available(mut self, available: bool) -> Self {
        self.id_available = available;
        self
    }

    pub fn with_signup_status(mut self, status: u16) -> Self {
        self.signup_status = Some(status);
        self
    }

    pub fn with_find_id_status(mut self, status: u16) -> Self {
        self.find_id_status = Some(status);
        self
    }

    pub fn with_reset_token(mut self, token: Option<&str>) -> Self {
        self.reset_token = token.map(String::from);
        self
    }

    pub fn with_profile_status(mut self, status: u16) -> Self {
        self.profile_status = Some(status);
        self
    }

    pub fn with_profile_delay(mut self, delay: Duration) -> Self {
        self.profile_delay = Some(delay);
        self
    }

    pub fn with_confirm_error(mut self, status: u16, message: Option<&str>) -> Self {
        self.confirm_error = Some(Self::status(status, message));
        self
    }

    pub fn with_reset_error(mut self, status: u16, message: Option<&str>) -> Self {
        self.reset_error = Some(Self::status(status, message));
        self
    }

    pub fn with_signed_url_status(mut self, status: u16) -> Self {
        self.signed_url_status = Some(status);
        self
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.recorded().calls.push(call);
    }

    fn record_with_token(&self, call: Call, token: &str) {
        let mut recorded = self.recorded();
        recorded.calls.push(call);
        recorded.last_token = Some(token.to_string());
    }

    fn fail_with(status: Option<u16>) -> Result<(), BackendError> {
        match status {
            Some(status) => Err(Self::status(status, None)),
            None => Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.recorded().calls.clone()
    }

    pub fn last_token(&self) -> Option<String> {
        self.recorded().last_token.clone()
    }

    pub fn last_signup(&self) -> Option<SignupSubmission> {
        self.recorded().last_signup.clone()
    }

    pub fn last_password_change(&self) -> Option<PasswordChange> {
        self.recorded().last_password_change.clone()
    }

    pub fn last_confirmation(&self) -> Option<PaymentConfirmation> {
        self.recorded().last_confirmation.clone()
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginGrant, BackendError> {
        self.record(Call::Login);
        self.login.clone()
    }

    async fn signup(&self, submission: &SignupSubmission) -> Result<(), BackendError> {
        {
            let mut recorded = self.recorded();
            recorded.calls.push(Call::Signup);
            recorded.last_signup = Some(submission.clone());
        }
        Self::fail_with(self.signup_status)
    }

    async fn check_id(&self, _mb_id: &str) -> Result<Availability, BackendError> {
        self.record(Call::CheckId);
        Ok(Availability {
            available: self.id_available,
            message: None,
        })
    }

    async fn check_nick(&self, _mb_nick: &str) -> Result<Availability, BackendError> {
        self.record(Call::CheckNick);
        Ok(Availability {
            available: true,
            message: None,
        })
    }

    async fn check_token(&self, token: &str) -> Result<(), BackendError> {
        self.record_with_token(Call::CheckToken, token);
        if let Some(delay) = self.profile_delay {
            tokio::time::sleep(delay).await;
        }
        Self::fail_with(self.profile_status)
    }

    async fn find_id(&self, _query: &FindIdQuery) -> Result<FoundId, BackendError> {
        self.record(Call::FindId);
        Self::fail_with(self.find_id_status)?;
        Ok(FoundId {
            mb_id: "member01".to_string(),
        })
    }

    async fn request_reset_code(&self, _request: &CodeRequest) -> Result<(), BackendError> {
        self.record(Call::RequestResetCode);
        Ok(())
    }

    async fn verify_reset_code(
        &self,
        _verification: &CodeVerification,
    ) -> Result<VerifiedCode, BackendError> {
        self.record(Call::VerifyResetCode);
        Ok(VerifiedCode {
            reset_token: self.reset_token.clone(),
        })
    }

    async fn reset_password(&self, change: &PasswordChange) -> Result<(), BackendError> {
        let mut recorded = self.recorded();
        recorded.calls.push(Call::ResetPassword);
        recorded.last_password_change = Some(change.clone());
        match &self.reset_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn complete_profile(
        &self,
        token: &str,
        _completion: &ProfileCompletion,
    ) -> Result<(), BackendError> {
        self.record_with_token(Call::CompleteProfile, token);
        Ok(())
    }
}

#[async_trait]
impl PaymentBackend for FakeBackend {
    async fn create_order(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<PaymentOrder, BackendError> {
        self.record_with_token(Call::CreateOrder, token);
        Ok(PaymentOrder {
            order_id: format!("order-{}", request.lecture_package_id),
            amount: 55000,
            title: "React 완주반".to_string(),
        })
    }

    async fn confirm_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), BackendError> {
        {
            let mut recorded = self.recorded();
            recorded.calls.push(Call::ConfirmPayment);
            recorded.last_confirmation = Some(confirmation.clone());
        }
        match &self.confirm_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AdminBackend for FakeBackend {
    async fn members(
        &self,
        token: &str,
        _query: &QueryPairs,
    ) -> Result<Page<MemberRow>, BackendError> {
        self.record_with_token(Call::Admin("members"), token);
        Ok(Page {
            items: Vec::new(),
            total: Some(0),
            page: Some(1),
        })
    }

    async fn update_member_level(
        &self,
        token: &str,
        _member_id: u64,
        _change: &LevelChange,
    ) -> Result<(), BackendError> {
        self.record_with_token(Call::Admin("update_member_level"), token);
        Ok(())
    }

    async fn payments(
        &self,
        token: &str,
        _query: &QueryPairs,
    ) -> Result<Page<PaymentRow>, BackendError> {
        self.record_with_token(Call::Admin("payments"), token);
        Ok(Page {
            items: Vec::new(),
            total: None,
            page: None,
        })
    }

    async fn stats(&self, token: &str) -> Result<serde_json::Value, BackendError> {
        self.record_with_token(Call::Admin("stats"), token);
        Ok(serde_json::json!({"members": 10, "payments": 3}))
    }

    async fn user_stats(&self, token: &str) -> Result<serde_json::Value, BackendError> {
        self.record_with_token(Call::Admin("user_stats"), token);
        Ok(serde_json::json!([]))
    }

    async fn devices(&self, token: &str, _user_id: &str) -> Result<Vec<DeviceRecord>, BackendError> {
        self.record_with_token(Call::Admin("devices"), token);
        Ok(Vec::new())
    }

    async fn delete_device(
        &self,
        token: &str,
        _user_id: &str,
        _device_id: &str,
    ) -> Result<(), BackendError> {
        self.record_with_token(Call::Admin("delete_device"), token);
        Ok(())
    }

    async fn files(&self, token: &str, _query: &QueryPairs) -> Result<Vec<StoredFile>, BackendError> {
        self.record_with_token(Call::Admin("files"), token);
        Ok(Vec::new())
    }

    async fn presigned_upload(
        &self,
        token: &str,
        _query: &QueryPairs,
    ) -> Result<PresignedUpload, BackendError> {
        self.record_with_token(Call::Admin("presigned_upload"), token);
        Ok(PresignedUpload {
            url: "https://upload.example/put".to_string(),
            key: "videos/a.mp4".to_string(),
        })
    }

    async fn delete_file(&self, token: &str, _file_id: u64) -> Result<(), BackendError> {
        self.record_with_token(Call::Admin("delete_file"), token);
        Ok(())
    }
}

fn lecture(id: u64, draft: &LectureDraft) -> Lecture {
    Lecture {
        id,
        title: draft.title.clone().unwrap_or_default(),
        description: draft.description.clone(),
        package_id: draft.package_id,
        duration_secs: None,
    }
}

#[async_trait]
impl CatalogBackend for FakeBackend {
    async fn lecture_packages(&self) -> Result<Vec<LecturePackage>, BackendError> {
        self.record(Call::Catalog("lecture_packages"));
        Ok(vec![LecturePackage {
            id: 3,
            title: "React 완주반".to_string(),
            price: 55000,
            description: None,
            thumbnail_url: None,
        }])
    }

    async fn lectures(&self, _query: &QueryPairs) -> Result<Vec<Lecture>, BackendError> {
        self.record(Call::Catalog("lectures"));
        Ok(Vec::new())
    }

    async fn create_lecture(
        &self,
        token: &str,
        draft: &LectureDraft,
    ) -> Result<Lecture, BackendError> {
        self.record_with_token(Call::Admin("create_lecture"), token);
        Ok(lecture(1, draft))
    }

    async fn update_lecture(
        &self,
        token: &str,
        lecture_id: u64,
        draft: &LectureDraft,
    ) -> Result<Lecture, BackendError> {
        self.record_with_token(Call::Admin("update_lecture"), token);
        Ok(lecture(lecture_id, draft))
    }

    async fn signed_lecture_url(
        &self,
        token: &str,
        lecture_id: u64,
    ) -> Result<SignedUrl, BackendError> {
        self.record_with_token(Call::Catalog("signed_lecture_url"), token);
        Self::fail_with(self.signed_url_status)?;
        Ok(SignedUrl {
            url: format!("https://cdn.example/lectures/{}?sig=x", lecture_id),
            expires_at: None,
        })
    }
}

pub fn test_state(backend: FakeBackend) -> AppState {
    AppState {
        backend: Arc::new(backend),
        sessions: Arc::new(JwtSessionCodec::new(SessionConfig::default())),
        flows: Arc::new(InMemoryFlowStore::new()),
        limiter: None,
        in_flight: InFlightRegistry::new(),
        checkout: CheckoutConfig {
            client_key: "test_ck".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        },
        cookie_secure: false,
        trust_proxy: false,
    }
}

pub fn test_app(
    state: &AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(state.clone()))
        .configure(|cfg| crate::handlers::configure_routes(cfg, state))
}

/// A valid session cookie for `member01` at `level`, carrying `token-{level}`.
pub fn session_cookie_for(state: &AppState, level: u8, need_profile_update: bool) -> Cookie<'static> {
    let session = Session::new(user(level, need_profile_update), format!("token-{}", level));
    let token = state.sessions.issue(&session).unwrap();
    session_cookie(token, 3600, false)
}
