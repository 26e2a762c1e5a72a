//! Number range, subscriber, upload and dashboard DTOs

use super::common::{non_blank, parse_optional, PaginationParams};
use ltra_core::traits::NumberRangeFilter;
use ltra_core::AppResult;
use ltra_services::RangeAllocation;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumberRangeListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub search: Option<String>,
    pub status: Option<String>,
    pub telco_id: Option<Uuid>,
}

impl NumberRangeListQuery {
    pub fn filter(&self) -> AppResult<NumberRangeFilter> {
        Ok(NumberRangeFilter {
            search: non_blank(&self.search),
            status: parse_optional(self.status.as_deref())?,
            telco_id: self.telco_id,
        })
    }
}

/// `POST /number-ranges` body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AllocateRangeRequest {
    #[validate(length(min = 1, max = 10, message = "Prefix is required"))]
    pub prefix: String,

    #[validate(length(min = 1, max = 15))]
    pub start_number: String,

    #[validate(length(min = 1, max = 15))]
    pub end_number: String,

    pub telco_id: Option<Uuid>,

    pub license_id: Option<Uuid>,
}

impl From<AllocateRangeRequest> for RangeAllocation {
    fn from(req: AllocateRangeRequest) -> Self {
        RangeAllocation {
            prefix: req.prefix,
            start_number: req.start_number,
            end_number: req.end_number,
            telco_id: req.telco_id,
            license_id: req.license_id,
        }
    }
}

/// `GET /subscribers/search?q=` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriberSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `POST /uploads?file_name=` query
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

/// `GET /dashboard/licenses-per-month?year=` query; defaults to the current year
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_request_validation() {
        let req = AllocateRangeRequest {
            prefix: String::new(),
            start_number: "20300000000".to_string(),
            end_number: "20300999999".to_string(),
            telco_id: None,
            license_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_range_filter_rejects_unknown_status() {
        let query = NumberRangeListQuery {
            status: Some("LEASED".to_string()),
            ..Default::default()
        };
        assert!(query.filter().is_err());
    }
}
