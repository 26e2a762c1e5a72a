use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::instrument;

/// Most recent audit entries, newest first
///
/// GET /api/v1/system-logs
#[instrument(skip(services, _user))]
pub async fn list_logs(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let logs = services.audit.recent().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(logs)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/system-logs", web::get().to(list_logs));
}
