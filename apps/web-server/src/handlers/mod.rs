//! HTTP handlers and route configuration.

mod admin;
mod health;
mod lectures;
mod login;
mod payments;
mod profile;
mod purchase;
mod recovery;
mod signup;

use actix_web::{error::JsonPayloadError, web};

use lectern_core::domain::Role;

use crate::middleware::error::AppError;
use crate::middleware::guard::RequireRole;
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

fn json_error(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected request body: {}", err);
    AppError::BadRequest("입력값을 확인해주세요.".to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/api/health", web::get().to(health::health_check))
        .route("/session", web::get().to(login::current_session))
        // Credential forms
        .service(
            web::scope("/form")
                .wrap(RateLimitMiddleware::new(state.limiter.clone()).trust_proxy(state.trust_proxy))
                .route("/login", web::post().to(login::login))
                .route("/logout", web::post().to(login::logout))
                .route("/signup/check-id", web::post().to(signup::check_id))
                .route("/signup/check-nick", web::post().to(signup::check_nick))
                .route("/signup", web::post().to(signup::submit))
                .route("/find-id", web::post().to(recovery::find_id))
                .route("/find-password", web::get().to(recovery::reset_status))
                .route("/find-password/request", web::post().to(recovery::request_code))
                .route("/find-password/verify", web::post().to(recovery::verify_code))
                .route("/find-password/reset", web::post().to(recovery::reset_password))
                .route("/find-password/restart", web::post().to(recovery::restart))
                .route("/complete-profile", web::put().to(profile::complete_profile)),
        )
        // Purchase gate and checkout
        .route("/purchase/{package_id}", web::get().to(purchase::purchase_gate))
        .service(
            web::scope("/payments")
                .route("/order", web::post().to(payments::create_order))
                .route("/checkout/{package_id}", web::get().to(payments::checkout_page))
                .route("/success", web::get().to(payments::payment_success))
                .route("/fail", web::get().to(payments::payment_fail)),
        )
        // Catalog
        .service(
            web::scope("/lectures")
                .route("", web::get().to(lectures::list))
                .route("/packages", web::get().to(lectures::packages))
                .route("/{lecture_id}/play", web::get().to(lectures::play)),
        )
        // Admin: the guard runs before every handler in the scope
        .service(
            web::scope("/admin")
                .wrap(RequireRole::new(Role::Admin))
                .route("", web::get().to(admin::dashboard))
                .service(
                    web::scope("/api")
                        .route("/members", web::get().to(admin::members))
                        .route("/members/{member_id}/level", web::put().to(admin::update_level))
                        .route("/payments", web::get().to(admin::payments))
                        .route("/stats", web::get().to(admin::stats))
                        .route("/stats/users", web::get().to(admin::user_stats))
                        .route("/devices/{user_id}", web::get().to(admin::devices))
                        .route(
                            "/devices/{user_id}/{device_id}",
                            web::delete().to(admin::delete_device),
                        )
                        .route("/lectures", web::post().to(admin::create_lecture))
                        .route("/lectures/{lecture_id}", web::patch().to(admin::update_lecture))
                        .route("/files", web::get().to(admin::files))
                        .route("/files/presigned", web::get().to(admin::presigned_upload))
                        .route("/files/{file_id}", web::delete().to(admin::delete_file)),
                ),
        );
}
