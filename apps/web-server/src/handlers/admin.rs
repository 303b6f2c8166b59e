//! Admin dashboard API. Every route sits behind the admin role guard and
//! calls the backend with the admin's own bearer token.

use actix_web::{HttpResponse, web};

use lectern_core::domain::admin::LevelChange;
use lectern_core::domain::catalog::LectureDraft;
use lectern_core::domain::member::mask_id;
use lectern_core::ports::QueryPairs;
use lectern_shared::dto::{LevelForm, MessageResponse};

use crate::middleware::error::AppResult;
use crate::session::Authenticated;
use crate::state::AppState;

/// GET /admin
pub async fn dashboard(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
) -> AppResult<HttpResponse> {
    let stats = state.backend.stats(&session.access_token).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /admin/api/members
pub async fn members(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    query: web::Query<QueryPairs>,
) -> AppResult<HttpResponse> {
    let page = state.backend.members(&session.access_token, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// PUT /admin/api/members/{member_id}/level
pub async fn update_level(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    path: web::Path<u64>,
    body: web::Json<LevelForm>,
) -> AppResult<HttpResponse> {
    let member_id = path.into_inner();
    let change = LevelChange::new(body.mb_level)?;

    state
        .backend
        .update_member_level(&session.access_token, member_id, &change)
        .await?;

    tracing::info!(
        admin = %mask_id(&session.user.mb_id),
        member_id,
        mb_level = change.mb_level,
        "Member level changed"
    );
    Ok(HttpResponse::Ok().json(MessageResponse::new("회원 레벨이 변경되었습니다.")))
}

/// GET /admin/api/payments
pub async fn payments(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    query: web::Query<QueryPairs>,
) -> AppResult<HttpResponse> {
    let page = state.backend.payments(&session.access_token, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /admin/api/stats
pub async fn stats(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.backend.stats(&session.access_token).await?))
}

/// GET /admin/api/stats/users
pub async fn user_stats(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.backend.user_stats(&session.access_token).await?))
}

/// GET /admin/api/devices/{user_id}
pub async fn devices(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let devices = state
        .backend
        .devices(&session.access_token, &path)
        .await?;
    Ok(HttpResponse::Ok().json(devices))
}

/// DELETE /admin/api/devices/{user_id}/{device_id}
pub async fn delete_device(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (user_id, device_id) = path.into_inner();
    state
        .backend
        .delete_device(&session.access_token, &user_id, &device_id)
        .await?;
    tracing::info!(admin = %mask_id(&session.user.mb_id), user_id = %mask_id(&user_id), "Device removed");
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/api/lectures
pub async fn create_lecture(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    body: web::Json<LectureDraft>,
) -> AppResult<HttpResponse> {
    let lecture = state
        .backend
        .create_lecture(&session.access_token, &body)
        .await?;
    Ok(HttpResponse::Created().json(lecture))
}

/// PATCH /admin/api/lectures/{lecture_id}
pub async fn update_lecture(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    path: web::Path<u64>,
    body: web::Json<LectureDraft>,
) -> AppResult<HttpResponse> {
    let lecture = state
        .backend
        .update_lecture(&session.access_token, path.into_inner(), &body)
        .await?;
    Ok(HttpResponse::Ok().json(lecture))
}

/// GET /admin/api/files
pub async fn files(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    query: web::Query<QueryPairs>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.backend.files(&session.access_token, &query).await?))
}

/// GET /admin/api/files/presigned
pub async fn presigned_upload(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    query: web::Query<QueryPairs>,
) -> AppResult<HttpResponse> {
    let upload = state
        .backend
        .presigned_upload(&session.access_token, &query)
        .await?;
    Ok(HttpResponse::Ok().json(upload))
}

/// DELETE /admin/api/files/{file_id}
pub async fn delete_file(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    state
        .backend
        .delete_file(&session.access_token, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
