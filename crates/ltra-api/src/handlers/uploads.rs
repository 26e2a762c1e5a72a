//! Bulk data upload handler

use crate::dto::{ApiResponse, UploadQuery};
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::{info, instrument};

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accept a CSV or Excel file for import
///
/// The raw file is the request body; its name comes from `?file_name=`.
///
/// POST /api/v1/uploads?file_name=
#[instrument(skip(services, user, body), fields(user = %user.email, size = body.len()))]
pub async fn upload(
    services: web::Data<Services>,
    query: web::Query<UploadQuery>,
    user: StaffUser,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let report = services
        .uploads
        .check(&query.file_name, &body, &user.email)
        .await?;
    info!(file = %report.file_name, rows = ?report.rows, "Upload accepted");

    let message = report.message;
    Ok(HttpResponse::Accepted().json(ApiResponse::with_message(report, message)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/uploads")
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .route(web::post().to(upload)),
    );
}
