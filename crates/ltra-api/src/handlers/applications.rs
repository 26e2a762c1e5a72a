//! Application (licensing dossier) handlers

use super::validate_request;
use crate::dto::{
    ApiResponse, ApplicationListQuery, CreateApplicationRequest, MoveCardRequest,
    UpdateStatusRequest,
};
use actix_web::{web, HttpResponse};
use ltra_auth::{ReviewerUser, StaffUser};
use ltra_core::workflow;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::{info, instrument};
use uuid::Uuid;

/// GET /api/v1/applications
#[instrument(skip(services, _user))]
pub async fn list_applications(
    services: web::Data<Services>,
    query: web::Query<ApplicationListQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    validate_request(&query.pagination, "Pagination")?;
    let filter = query.filter()?;

    let (applications, total) = services
        .applications
        .list(&filter, &query.pagination.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(query.pagination.paginate(applications, total)))
}

/// GET /api/v1/applications/{id}
#[instrument(skip(services, _user))]
pub async fn get_application(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let application = services.applications.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(application)))
}

/// POST /api/v1/applications
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_application(
    services: web::Data<Services>,
    user: StaffUser,
    req: web::Json<CreateApplicationRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Application")?;

    let application = services
        .applications
        .create(req.into_inner().into(), &user.email)
        .await?;
    info!(code = %application.code, "Application created");

    let message = workflow::created_message(&application.code);
    Ok(HttpResponse::Created().json(ApiResponse::with_message(application, message)))
}

/// PUT /api/v1/applications/{id}/status
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_status(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: ReviewerUser,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let application = services
        .applications
        .update_status(path.into_inner(), req.status, req.submission_date, &user.email)
        .await?;

    let message = workflow::status_changed_message(&application.code, application.status);
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(application, message)))
}

/// Drag a card to another board column
///
/// POST /api/v1/applications/{id}/move
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn move_card(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: ReviewerUser,
    req: web::Json<MoveCardRequest>,
) -> Result<HttpResponse, AppError> {
    let application = services
        .applications
        .move_card(path.into_inner(), req.status, &user.email)
        .await?;

    let message = workflow::status_changed_message(&application.code, application.status);
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(application, message)))
}

/// GET /api/v1/applications/board
#[instrument(skip(services, _user))]
pub async fn board(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let columns = services.applications.board().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(columns)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/applications")
            .route("", web::get().to(list_applications))
            .route("", web::post().to(create_application))
            .route("/board", web::get().to(board))
            .route("/{id}", web::get().to(get_application))
            .route("/{id}/status", web::put().to(update_status))
            .route("/{id}/move", web::post().to(move_card)),
    );
}
