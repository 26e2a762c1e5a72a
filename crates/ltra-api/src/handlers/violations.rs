//! Compliance violation handlers

use super::validate_request;
use crate::dto::{ApiResponse, ViolationListQuery, ViolationRequest};
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::{info, instrument};
use uuid::Uuid;

/// GET /api/v1/violations
#[instrument(skip(services, _user))]
pub async fn list_violations(
    services: web::Data<Services>,
    query: web::Query<ViolationListQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    validate_request(&query.pagination, "Pagination")?;
    let filter = query.filter()?;

    let (violations, total) = services
        .violations
        .list(&filter, &query.pagination.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(query.pagination.paginate(violations, total)))
}

/// GET /api/v1/violations/summary
#[instrument(skip(services, _user))]
pub async fn summary(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let summary = services.violations.summary().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// GET /api/v1/violations/{id}
#[instrument(skip(services, _user))]
pub async fn get_violation(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let violation = services.violations.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(violation)))
}

/// Record a violation
///
/// POST /api/v1/violations
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_violation(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<ViolationRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Violation")?;

    let violation = services
        .violations
        .create(req.into_inner().into_violation(), &user.email)
        .await?;
    info!(severity = %violation.severity, "Violation recorded");

    Ok(HttpResponse::Created().json(ApiResponse::success(violation)))
}

/// Investigate or resolve a violation
///
/// PUT /api/v1/violations/{id}
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_violation(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: StaffUser,
    req: web::Json<ViolationRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Violation")?;

    let violation = services
        .violations
        .update(path.into_inner(), req.into_inner().into_violation(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(violation)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/violations")
            .route("", web::get().to(list_violations))
            .route("", web::post().to(create_violation))
            .route("/summary", web::get().to(summary))
            .route("/{id}", web::get().to(get_violation))
            .route("/{id}", web::put().to(update_violation)),
    );
}
