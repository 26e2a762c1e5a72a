//! Numbering resource handlers

use super::validate_request;
use crate::dto::{AllocateRangeRequest, ApiResponse, NumberRangeListQuery};
use actix_web::{web, HttpResponse};
use ltra_auth::{ReviewerUser, StaffUser};
use ltra_core::AppError;
use ltra_services::Services;
use tracing::{info, instrument};
use uuid::Uuid;

/// GET /api/v1/number-ranges
#[instrument(skip(services, _user))]
pub async fn list_ranges(
    services: web::Data<Services>,
    query: web::Query<NumberRangeListQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    validate_request(&query.pagination, "Pagination")?;
    let filter = query.filter()?;

    let (ranges, total) = services
        .number_ranges
        .list(&filter, &query.pagination.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(query.pagination.paginate(ranges, total)))
}

/// In-use and available blocks plus the estimated subscriber base
///
/// GET /api/v1/number-ranges/summary
#[instrument(skip(services, _user))]
pub async fn summary(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let summary = services.number_ranges.summary().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// POST /api/v1/number-ranges
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn allocate_range(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<AllocateRangeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Number range")?;

    let range = services
        .number_ranges
        .allocate(req.into_inner().into(), &user.email)
        .await?;
    info!(prefix = %range.prefix, status = %range.status, "Number range allocated");

    Ok(HttpResponse::Created().json(ApiResponse::success(range)))
}

/// POST /api/v1/number-ranges/{id}/revoke
#[instrument(skip(services, user), fields(user = %user.email))]
pub async fn revoke_range(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: ReviewerUser,
) -> Result<HttpResponse, AppError> {
    let range = services
        .number_ranges
        .revoke(path.into_inner(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(range)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/number-ranges")
            .route("", web::get().to(list_ranges))
            .route("", web::post().to(allocate_range))
            .route("/summary", web::get().to(summary))
            .route("/{id}/revoke", web::post().to(revoke_range)),
    );
}
