//! Enterprise, license and violation DTOs

use super::common::{non_blank, parse_optional, PaginationParams};
use chrono::{NaiveDate, Utc};
use ltra_core::models::{
    ComplianceViolation, Enterprise, License, LicenseStatus, Status, ViolationSeverity,
    ViolationStatus,
};
use ltra_core::traits::{EnterpriseFilter, LicenseFilter, ViolationFilter};
use ltra_core::AppResult;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Enterprises
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnterpriseListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl EnterpriseListQuery {
    pub fn filter(&self) -> AppResult<EnterpriseFilter> {
        Ok(EnterpriseFilter {
            search: non_blank(&self.search),
            status: parse_optional(self.status.as_deref())?,
        })
    }
}

/// Create or update an enterprise
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnterpriseRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub tax_code: String,

    #[serde(default)]
    pub representative: String,

    pub enterprise_type_id: Option<Uuid>,

    #[serde(default)]
    pub status: Status,
}

impl EnterpriseRequest {
    pub fn into_enterprise(self) -> Enterprise {
        Enterprise {
            name: self.name.trim().to_string(),
            tax_code: self.tax_code.trim().to_string(),
            representative: self.representative,
            enterprise_type_id: self.enterprise_type_id,
            status: self.status,
            ..Default::default()
        }
    }
}

// ============================================================================
// Licenses
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub search: Option<String>,
    pub status: Option<String>,
    pub enterprise_id: Option<Uuid>,
}

impl LicenseListQuery {
    pub fn filter(&self) -> AppResult<LicenseFilter> {
        Ok(LicenseFilter {
            search: non_blank(&self.search),
            status: parse_optional(self.status.as_deref())?,
            enterprise_id: self.enterprise_id,
        })
    }
}

/// Issue or update a license
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LicenseRequest {
    #[validate(length(min = 1, max = 100, message = "License number is required"))]
    pub license_number: String,

    pub enterprise_id: Uuid,

    pub license_type_id: Option<Uuid>,

    /// Defaults to today
    pub issue_date: Option<NaiveDate>,

    pub expiry_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: LicenseStatus,

    #[validate(url)]
    pub file_url: Option<String>,
}

impl LicenseRequest {
    pub fn into_license(self) -> License {
        License {
            license_number: self.license_number,
            enterprise_id: self.enterprise_id,
            license_type_id: self.license_type_id,
            issue_date: self.issue_date.unwrap_or_else(|| Utc::now().date_naive()),
            expiry_date: self.expiry_date,
            status: self.status,
            file_url: self.file_url,
            ..Default::default()
        }
    }
}

// ============================================================================
// Violations
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViolationListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub search: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
}

impl ViolationListQuery {
    pub fn filter(&self) -> AppResult<ViolationFilter> {
        Ok(ViolationFilter {
            search: non_blank(&self.search),
            status: parse_optional(self.status.as_deref())?,
            severity: parse_optional(self.severity.as_deref())?,
        })
    }
}

/// Record or update a compliance violation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ViolationRequest {
    /// Defaults to today
    pub detection_date: Option<NaiveDate>,

    pub license_id: Option<Uuid>,

    pub enterprise_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Violation type is required"))]
    pub violation_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub severity: ViolationSeverity,

    #[serde(default)]
    pub status: ViolationStatus,
}

impl ViolationRequest {
    pub fn into_violation(self) -> ComplianceViolation {
        ComplianceViolation {
            detection_date: self
                .detection_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            license_id: self.license_id,
            enterprise_id: self.enterprise_id,
            violation_type: self.violation_type,
            description: self.description,
            severity: self.severity,
            status: self.status,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enterprise_request_defaults() {
        let req: EnterpriseRequest = serde_json::from_str(r#"{"name": " Best Telecom "}"#).unwrap();
        assert!(req.validate().is_ok());

        let enterprise = req.into_enterprise();
        assert_eq!(enterprise.name, "Best Telecom");
        assert_eq!(enterprise.status, Status::Active);
    }

    #[test]
    fn test_license_request_rejects_bad_url() {
        let req: LicenseRequest = serde_json::from_str(
            r#"{
                "license_number": "GP-NET-2025-010",
                "enterprise_id": "00000000-0000-0005-0000-000000000001",
                "file_url": "not a url"
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_violation_filter_parses_severity() {
        let query = ViolationListQuery {
            severity: Some("high".to_string()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.severity, Some(ViolationSeverity::High));
        assert!(filter.status.is_none());
    }
}
