//! License registry handlers

use super::validate_request;
use crate::dto::{ApiResponse, LicenseListQuery, LicenseRequest};
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::{info, instrument};
use uuid::Uuid;

/// GET /api/v1/licenses
#[instrument(skip(services, _user))]
pub async fn list_licenses(
    services: web::Data<Services>,
    query: web::Query<LicenseListQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    validate_request(&query.pagination, "Pagination")?;
    let filter = query.filter()?;

    let (licenses, total) = services
        .licenses
        .list(&filter, &query.pagination.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(query.pagination.paginate(licenses, total)))
}

/// Active and expired counts
///
/// GET /api/v1/licenses/summary
#[instrument(skip(services, _user))]
pub async fn summary(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let summary = services.licenses.summary().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// GET /api/v1/licenses/{id}
#[instrument(skip(services, _user))]
pub async fn get_license(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let license = services.licenses.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(license)))
}

/// POST /api/v1/licenses
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_license(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<LicenseRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "License")?;

    let license = services
        .licenses
        .create(req.into_inner().into_license(), &user.email)
        .await?;
    info!(number = %license.license_number, "License issued");

    Ok(HttpResponse::Created().json(ApiResponse::success(license)))
}

/// PUT /api/v1/licenses/{id}
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_license(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: StaffUser,
    req: web::Json<LicenseRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "License")?;

    let license = services
        .licenses
        .update(path.into_inner(), req.into_inner().into_license(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(license)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/licenses")
            .route("", web::get().to(list_licenses))
            .route("", web::post().to(create_license))
            .route("/summary", web::get().to(summary))
            .route("/{id}", web::get().to(get_license))
            .route("/{id}", web::put().to(update_license)),
    );
}
