//! Public catalog and signed playback URLs.

use actix_web::{HttpResponse, web};

use lectern_core::ports::QueryPairs;

use crate::middleware::error::{AppError, AppResult};
use crate::session::Authenticated;
use crate::state::AppState;

/// GET /lectures/packages
pub async fn packages(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let packages = state.backend.lecture_packages().await?;
    Ok(HttpResponse::Ok().json(packages))
}

/// GET /lectures
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<QueryPairs>,
) -> AppResult<HttpResponse> {
    let lectures = state.backend.lectures(&query).await?;
    Ok(HttpResponse::Ok().json(lectures))
}

/// GET /lectures/{lecture_id}/play
pub async fn play(
    state: web::Data<AppState>,
    Authenticated(session): Authenticated,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let lecture_id = path.into_inner();
    let signed = state
        .backend
        .signed_lecture_url(&session.access_token, lecture_id)
        .await
        .map_err(|e| match e.status() {
            Some(403) => AppError::Forbidden("강의 구매 후 시청할 수 있습니다.".to_string()),
            _ => AppError::from(e),
        })?;
    Ok(HttpResponse::Ok().json(signed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeBackend, session_cookie_for, test_app, test_state};
    use actix_web::test;

    #[actix_web::test]
    async fn test_unpurchased_lecture_is_forbidden() {
        let state = test_state(FakeBackend::default().with_signed_url_status(403));
        let app = test::init_service(test_app(&state)).await;
        let req = test::TestRequest::get()
            .uri("/lectures/4/play")
            .cookie(session_cookie_for(&state, 2, false))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 403);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "강의 구매 후 시청할 수 있습니다.");
    }

    #[actix_web::test]
    async fn test_catalog_is_public() {
        let state = test_state(FakeBackend::default());
        let app = test::init_service(test_app(&state)).await;
        let req = test::TestRequest::get().uri("/lectures/packages").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["id"], 3);

        let req = test::TestRequest::get().uri("/lectures?packageId=3").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 200);
    }
}
