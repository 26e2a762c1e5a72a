//! License model

use super::{Enterprise, LicenseType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    /// License lifecycle status
    pub enum LicenseStatus {
        #[default]
        Draft => "DRAFT",
        PendingActivation => "PENDING_ACTIVATION",
        Active => "ACTIVE",
        Suspended => "SUSPENDED",
        Expired => "EXPIRED",
        Revoked => "REVOKED",
    }
}

/// Operating license granted to an enterprise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub id: Uuid,
    pub license_number: String,
    pub enterprise_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<Enterprise>,
    pub license_type_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<LicenseType>,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: LicenseStatus,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl License {
    /// Match a free-text term against the license number and enterprise name
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.license_number.to_lowercase().contains(&term)
            || self
                .enterprise
                .as_ref()
                .is_some_and(|e| e.name.to_lowercase().contains(&term))
    }

    /// True when the license has an expiry date on or before `today`
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|d| d <= today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_status_round_trip_through_storage_string() {
        assert_eq!(
            LicenseStatus::from_db("PENDING_ACTIVATION"),
            LicenseStatus::PendingActivation
        );
        assert_eq!(LicenseStatus::PendingActivation.as_str(), "PENDING_ACTIVATION");
    }

    #[test]
    fn test_license_matches_enterprise_name() {
        let license = License {
            license_number: "GP-VT-001/2024".to_string(),
            enterprise: Some(Enterprise {
                name: "Unitel".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(license.matches("unitel"));
        assert!(license.matches("vt-001"));
        assert!(!license.matches("ltc"));
    }

    #[test]
    fn test_nested_license_deserializes_with_missing_fields() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","license_number":"L-1","status":"ACTIVE","issue_date":"2024-01-15"}"#;
        let license: License = serde_json::from_str(json).unwrap();
        assert_eq!(license.status, LicenseStatus::Active);
        assert!(license.expiry_date.is_none());
        assert!(license.enterprise.is_none());
    }
}
