//! Reference catalogue: enterprise, service, license and resource types

use super::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    /// Grouping of a service type
    pub enum ServiceGroup {
        #[default]
        Telecom => "TELECOM",
        Vas => "VAS",
        Ott => "OTT",
    }
}

string_enum! {
    /// What a license type applies to
    pub enum LicenseCategory {
        #[default]
        Enterprise => "ENTERPRISE",
        Service => "SERVICE",
        Resource => "RESOURCE",
    }
}

/// Kind of enterprise (TELCO, ISP, VAS, OTT)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnterpriseType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub group_type: ServiceGroup,
    pub requires_license: bool,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub category: LicenseCategory,
    pub has_expiry: bool,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
}

/// Numbering resource kind with its format rule (e.g. a prefix pattern)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub format_rule: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
}
