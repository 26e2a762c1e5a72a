//! Dashboard handlers

use crate::dto::{ApiResponse, YearQuery};
use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::{debug, instrument};

/// GET /api/v1/dashboard/stats
#[instrument(skip(services, _user))]
pub async fn stats(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let stats = services.dashboard.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/// GET /api/v1/dashboard/overview
#[instrument(skip(services, _user))]
pub async fn overview(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let overview = services.dashboard.overview().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(overview)))
}

/// GET /api/v1/dashboard/licenses-per-month?year=
#[instrument(skip(services, _user))]
pub async fn licenses_per_month(
    services: web::Data<Services>,
    query: web::Query<YearQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    debug!(year, "Licenses per month");

    let points = services.dashboard.licenses_per_month(year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(points)))
}

/// GET /api/v1/dashboard/market-share
#[instrument(skip(services, _user))]
pub async fn market_share(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let points = services.dashboard.market_share().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(points)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("/stats", web::get().to(stats))
            .route("/overview", web::get().to(overview))
            .route("/licenses-per-month", web::get().to(licenses_per_month))
            .route("/market-share", web::get().to(market_share)),
    );
}
