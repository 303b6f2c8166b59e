//! Backend REST API ports. Every call that needs a member carries its bearer token.

use async_trait::async_trait;

use crate::domain::admin::{DeviceRecord, LevelChange, MemberRow, Page, PaymentRow};
use crate::domain::catalog::{
    Lecture, LectureDraft, LecturePackage, PresignedUpload, SignedUrl, StoredFile,
};
use crate::domain::credentials::{
    FindIdQuery, FoundId, LoginCredentials, LoginGrant, ProfileCompletion,
};
use crate::domain::password_reset::{CodeRequest, CodeVerification, PasswordChange, VerifiedCode};
use crate::domain::payment::{OrderRequest, PaymentConfirmation, PaymentOrder};
use crate::domain::signup::{Availability, SignupSubmission};
use crate::error::BackendError;

/// Pass-through query string pairs (paging, search filters).
pub type QueryPairs = Vec<(String, String)>;

/// `/api/auth/*` and `/api/users/*`.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, BackendError>;

    async fn signup(&self, submission: &SignupSubmission) -> Result<(), BackendError>;

    async fn check_id(&self, mb_id: &str) -> Result<Availability, BackendError>;

    async fn check_nick(&self, mb_nick: &str) -> Result<Availability, BackendError>;

    /// Confirms the token is still accepted server-side, not only present.
    /// Only the status counts; the profile body is not read.
    async fn check_token(&self, token: &str) -> Result<(), BackendError>;

    async fn find_id(&self, query: &FindIdQuery) -> Result<FoundId, BackendError>;

    async fn request_reset_code(&self, request: &CodeRequest) -> Result<(), BackendError>;

    async fn verify_reset_code(
        &self,
        verification: &CodeVerification,
    ) -> Result<VerifiedCode, BackendError>;

    async fn reset_password(&self, change: &PasswordChange) -> Result<(), BackendError>;

    async fn complete_profile(
        &self,
        token: &str,
        completion: &ProfileCompletion,
    ) -> Result<(), BackendError>;
}

/// `/payments/*`.
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    async fn create_order(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<PaymentOrder, BackendError>;

    async fn confirm_payment(&self, confirmation: &PaymentConfirmation)
    -> Result<(), BackendError>;
}

/// `/api/admin/*` and the admin-only file endpoints.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn members(&self, token: &str, query: &QueryPairs)
    -> Result<Page<MemberRow>, BackendError>;

    async fn update_member_level(
        &self,
        token: &str,
        member_id: u64,
        change: &LevelChange,
    ) -> Result<(), BackendError>;

    async fn payments(
        &self,
        token: &str,
        query: &QueryPairs,
    ) -> Result<Page<PaymentRow>, BackendError>;

    async fn stats(&self, token: &str) -> Result<serde_json::Value, BackendError>;

    async fn user_stats(&self, token: &str) -> Result<serde_json::Value, BackendError>;

    async fn devices(&self, token: &str, user_id: &str) -> Result<Vec<DeviceRecord>, BackendError>;

    async fn delete_device(
        &self,
        token: &str,
        user_id: &str,
        device_id: &str,
    ) -> Result<(), BackendError>;

    async fn files(&self, token: &str, query: &QueryPairs) -> Result<Vec<StoredFile>, BackendError>;

    async fn presigned_upload(
        &self,
        token: &str,
        query: &QueryPairs,
    ) -> Result<PresignedUpload, BackendError>;

    async fn delete_file(&self, token: &str, file_id: u64) -> Result<(), BackendError>;
}

/// `/api/lectures`, `/api/lecture-packages`, `/api/signed-urls/*`.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn lecture_packages(&self) -> Result<Vec<LecturePackage>, BackendError>;

    async fn lectures(&self, query: &QueryPairs) -> Result<Vec<Lecture>, BackendError>;

    async fn create_lecture(&self, token: &str, draft: &LectureDraft)
    -> Result<Lecture, BackendError>;

    async fn update_lecture(
        &self,
        token: &str,
        lecture_id: u64,
        draft: &LectureDraft,
    ) -> Result<Lecture, BackendError>;

    async fn signed_lecture_url(&self, token: &str, lecture_id: u64)
    -> Result<SignedUrl, BackendError>;
}

/// The whole backend surface, as one object in application state.
pub trait Backend: AuthBackend + PaymentBackend + AdminBackend + CatalogBackend {}

impl<T> Backend for T where T: AuthBackend + PaymentBackend + AdminBackend + CatalogBackend {}
