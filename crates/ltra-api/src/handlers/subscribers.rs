use super::validate_request;
use crate::dto::{ApiResponse, PaginationParams, SubscriberSearchQuery};
use actix_web::{web, HttpResponse};
use ltra_auth::StaffUser;
use ltra_core::AppError;
use ltra_services::Services;
use tracing::instrument;

/// GET /api/v1/subscribers
#[instrument(skip(services, _user))]
pub async fn list_subscribers(
    services: web::Data<Services>,
    query: web::Query<PaginationParams>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    validate_request(&*query, "Pagination")?;

    let (subscribers, total) = services.subscribers.list(&query.pagination()).await?;
    Ok(HttpResponse::Ok().json(query.paginate(subscribers, total)))
}

/// Look up subscribers by MSISDN, IMSI or ICCID
///
/// Input that is not a plausible identifier yields an empty list.
///
/// GET /api/v1/subscribers/search?q=
#[instrument(skip(services, _user))]
pub async fn search_subscribers(
    services: web::Data<Services>,
    query: web::Query<SubscriberSearchQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let results = services.subscribers.search(&query.q).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(results)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscribers")
            .route("", web::get().to(list_subscribers))
            .route("/search", web::get().to(search_subscribers)),
    );
}
