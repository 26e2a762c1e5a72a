//! Enterprise model
//!
//! A licensed telecom operator or service provider.

use super::{EnterpriseType, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enterprise {
    pub id: Uuid,
    pub name: String,
    pub tax_code: String,
    pub representative: String,
    pub enterprise_type_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_type: Option<EnterpriseType>,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Enterprise {
    /// Case-insensitive match of a free-text term against name and tax code
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.tax_code.to_lowercase().contains(&term)
    }
}
