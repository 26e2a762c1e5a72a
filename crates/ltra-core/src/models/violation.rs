//! Compliance violation model

use super::{Enterprise, License};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    pub enum ViolationSeverity {
        #[default]
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

string_enum! {
    pub enum ViolationStatus {
        #[default]
        New => "NEW",
        Investigating => "INVESTIGATING",
        Resolved => "RESOLVED",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceViolation {
    pub id: Uuid,
    pub detection_date: NaiveDate,
    pub license_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub enterprise_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<Enterprise>,
    pub violation_type: String,
    pub description: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub severity: ViolationSeverity,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: ViolationStatus,
}

impl ComplianceViolation {
    /// Match a free-text term against type, description and enterprise name
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.violation_type.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self
                .enterprise
                .as_ref()
                .is_some_and(|e| e.name.to_lowercase().contains(&term))
    }
}
