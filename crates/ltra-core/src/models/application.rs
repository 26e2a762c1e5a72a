//! License application model
//!
//! Applications move across the review board; see [`crate::workflow`].

use super::{Enterprise, License};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    /// Review status of an application
    pub enum ApplicationStatus {
        #[default]
        Draft => "DRAFT",
        Submitted => "SUBMITTED",
        Reviewing => "REVIEWING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    /// Kind of request an application makes
    pub enum ApplicationType {
        #[default]
        New => "NEW",
        Renew => "RENEW",
        Adjust => "ADJUST",
        Revoke => "REVOKE",
    }
}

impl ApplicationType {
    /// Vietnamese display label
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationType::New => "Cấp mới",
            ApplicationType::Renew => "Gia hạn",
            ApplicationType::Adjust => "Điều chỉnh",
            ApplicationType::Revoke => "Thu hồi",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub id: Uuid,
    pub code: String,
    pub enterprise_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<Enterprise>,
    pub license_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "crate::models::lenient")]
    pub application_type: ApplicationType,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: ApplicationStatus,
    pub workflow_step_id: Option<Uuid>,
    pub submission_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Match a free-text term against the code and enterprise name
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.code.to_lowercase().contains(&term)
            || self
                .enterprise
                .as_ref()
                .is_some_and(|e| e.name.to_lowercase().contains(&term))
    }
}

/// Input for creating an application
///
/// `enterprise_id` and `application_type` are optional here so that a
/// missing value can be reported as a missing field instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewApplication {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_type_serializes_as_type() {
        let app = Application {
            code: "HS-2024-001".to_string(),
            application_type: ApplicationType::Renew,
            ..Default::default()
        };
        let value = serde_json::to_value(&app).unwrap();
        assert_eq!(value["type"], "RENEW");
        assert_eq!(value["status"], "DRAFT");
        assert!(value.get("enterprise").is_none());
    }

    #[test]
    fn test_application_type_labels() {
        assert_eq!(ApplicationType::New.label(), "Cấp mới");
        assert_eq!(ApplicationType::Revoke.label(), "Thu hồi");
    }
}
