//! HTTP request handlers
//!
//! Every handler receives the service bundle as `web::Data<Services>` and
//! one of the role extractors from `ltra_auth`. Reads and creates need
//! `staff`, status changes need `reviewer`, access management needs
//! `admin`.

pub mod access;
pub mod applications;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod enterprises;
pub mod health;
pub mod licenses;
pub mod number_ranges;
pub mod subscribers;
pub mod system_logs;
pub mod uploads;
pub mod violations;

use actix_web::web;
use ltra_core::AppError;
use tracing::warn;
use validator::Validate;

pub use health::health;

/// Register every `/api/v1` route on `cfg`
///
/// Static segments (`/board`, `/summary`, `/search`) are registered ahead
/// of `/{id}` routes of the same scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure)
        .configure(dashboard::configure)
        .configure(catalog::configure)
        .configure(enterprises::configure)
        .configure(licenses::configure)
        .configure(applications::configure)
        .configure(number_ranges::configure)
        .configure(subscribers::configure)
        .configure(violations::configure)
        .configure(system_logs::configure)
        .configure(access::configure)
        .configure(uploads::configure);
}

/// Run request validation, logging and mapping failures to `Validation`
pub(crate) fn validate_request<T: Validate>(req: &T, what: &str) -> Result<(), AppError> {
    req.validate().map_err(|e| {
        warn!("{} validation failed: {}", what, e);
        AppError::Validation(e.to_string())
    })
}
