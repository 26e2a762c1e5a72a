//! Reference catalogue handlers

use super::validate_request;
use crate::dto::{ApiResponse, LicenseTypeRequest, ServiceTypeRequest};
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::instrument;
use uuid::Uuid;

/// GET /api/v1/enterprise-types
#[instrument(skip(services, _user))]
pub async fn enterprise_types(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let items = services.catalog.enterprise_types().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// GET /api/v1/resource-types
#[instrument(skip(services, _user))]
pub async fn resource_types(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let items = services.catalog.resource_types().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// GET /api/v1/service-types
#[instrument(skip(services, _user))]
pub async fn service_types(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let items = services.catalog.service_types().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// POST /api/v1/service-types
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_service_type(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<ServiceTypeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Service type")?;

    let item = services
        .catalog
        .create_service_type(req.into_inner().into(), &user.email)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(item)))
}

/// PUT /api/v1/service-types/{id}
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_service_type(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: StaffUser,
    req: web::Json<ServiceTypeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Service type")?;

    let item = services
        .catalog
        .update_service_type(path.into_inner(), req.into_inner().into(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

/// GET /api/v1/license-types
#[instrument(skip(services, _user))]
pub async fn license_types(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let items = services.catalog.license_types().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// POST /api/v1/license-types
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_license_type(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<LicenseTypeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "License type")?;

    let item = services
        .catalog
        .create_license_type(req.into_inner().into(), &user.email)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(item)))
}

/// PUT /api/v1/license-types/{id}
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_license_type(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: StaffUser,
    req: web::Json<LicenseTypeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "License type")?;

    let item = services
        .catalog
        .update_license_type(path.into_inner(), req.into_inner().into(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/enterprise-types", web::get().to(enterprise_types))
        .route("/resource-types", web::get().to(resource_types))
        .service(
            web::scope("/service-types")
                .route("", web::get().to(service_types))
                .route("", web::post().to(create_service_type))
                .route("/{id}", web::put().to(update_service_type)),
        )
        .service(
            web::scope("/license-types")
                .route("", web::get().to(license_types))
                .route("", web::post().to(create_license_type))
                .route("/{id}", web::put().to(update_license_type)),
        );
}
