//! Application DTOs

use super::common::{non_blank, parse_optional, PaginationParams};
use chrono::{DateTime, Utc};
use ltra_core::models::{ApplicationStatus, ApplicationType, NewApplication};
use ltra_core::traits::ApplicationFilter;
use ltra_core::AppResult;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// `GET /applications` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ApplicationListQuery {
    pub fn filter(&self) -> AppResult<ApplicationFilter> {
        Ok(ApplicationFilter {
            search: non_blank(&self.search),
            status: parse_optional(self.status.as_deref())?,
        })
    }
}

/// Application creation request
///
/// `enterprise_id` and `type` are optional here so that the service can
/// report which one is missing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: Option<String>,
    pub enterprise_id: Option<Uuid>,
    pub license_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub application_type: Option<ApplicationType>,
    pub status: Option<ApplicationStatus>,
    pub workflow_step_id: Option<Uuid>,
    pub submission_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(req: CreateApplicationRequest) -> Self {
        NewApplication {
            code: req.code,
            enterprise_id: req.enterprise_id,
            license_id: req.license_id,
            application_type: req.application_type,
            status: req.status,
            workflow_step_id: req.workflow_step_id,
            submission_date: req.submission_date,
            created_by: req.created_by,
        }
    }
}

/// `PUT /applications/{id}/status` body
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
    pub submission_date: Option<DateTime<Utc>>,
}

/// `POST /applications/{id}/move` body: the destination board column
#[derive(Debug, Clone, Deserialize)]
pub struct MoveCardRequest {
    pub status: ApplicationStatus,
}
