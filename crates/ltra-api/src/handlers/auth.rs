//! Authentication handlers

use super::validate_request;
use crate::dto::{ApiResponse, ChangePasswordRequest, LoginRequest, LoginResponse, MeResponse};
use actix_web::{cookie::Cookie, web, HttpResponse};
use chrono::{TimeZone, Utc};
use ltra_auth::{AuthenticatedUser, TOKEN_COOKIE};
use ltra_core::AppError;
use ltra_services::Services;
use serde_json::json;
use tracing::{debug, info, instrument};

/// Sign in
///
/// POST /api/v1/auth/login
#[instrument(skip(services, req))]
pub async fn login(
    services: web::Data<Services>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Login")?;

    let result = services.auth.login(&req.email, &req.password).await?;
    let expires_in = result.expires_in;

    let cookie = Cookie::build(TOKEN_COOKIE, result.token.clone())
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(LoginResponse::from(result))))
}

/// Sign out by clearing the token cookie
///
/// POST /api/v1/auth/logout
pub async fn logout() -> HttpResponse {
    debug!("Clearing token cookie");

    let cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(json!({ "logged_out": true })))
}

/// Current user with roles
///
/// GET /api/v1/auth/me
#[instrument(skip(services, user), fields(user = %user.email))]
pub async fn me(
    services: web::Data<Services>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let profile = services.auth.me(user.user_id).await?;

    let response = MeResponse {
        role: profile.effective_role(),
        user: profile,
        token_expires_at: Utc.timestamp_opt(user.claims.exp, 0).single(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// POST /api/v1/auth/change-password
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn change_password(
    services: web::Data<Services>,
    user: AuthenticatedUser,
    req: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Change password")?;

    services
        .auth
        .change_password(user.user_id, &req.current_password, &req.new_password)
        .await?;
    info!("Password changed");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        json!({ "changed": true }),
        "Đã đổi mật khẩu thành công",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/change-password", web::post().to(change_password)),
    );
}
