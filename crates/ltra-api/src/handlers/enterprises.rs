//! Enterprise registry handlers

use super::validate_request;
use crate::dto::{ApiResponse, EnterpriseListQuery, EnterpriseRequest};
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::instrument;
use uuid::Uuid;

/// GET /api/v1/enterprises
#[instrument(skip(services, _user))]
pub async fn list_enterprises(
    services: web::Data<Services>,
    query: web::Query<EnterpriseListQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    validate_request(&query.pagination, "Pagination")?;
    let filter = query.filter()?;

    let (enterprises, total) = services
        .enterprises
        .list(&filter, &query.pagination.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(query.pagination.paginate(enterprises, total)))
}

/// GET /api/v1/enterprises/{id}
#[instrument(skip(services, _user))]
pub async fn get_enterprise(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let enterprise = services.enterprises.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(enterprise)))
}

/// POST /api/v1/enterprises
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_enterprise(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<EnterpriseRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Enterprise")?;

    let enterprise = services
        .enterprises
        .create(req.into_inner().into_enterprise(), &user.email)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(enterprise)))
}

/// PUT /api/v1/enterprises/{id}
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_enterprise(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: StaffUser,
    req: web::Json<EnterpriseRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Enterprise")?;

    let enterprise = services
        .enterprises
        .update(path.into_inner(), req.into_inner().into_enterprise(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(enterprise)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/enterprises")
            .route("", web::get().to(list_enterprises))
            .route("", web::post().to(create_enterprise))
            .route("/{id}", web::get().to(get_enterprise))
            .route("/{id}", web::put().to(update_enterprise)),
    );
}
