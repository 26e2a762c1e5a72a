//! Number range model
//!
//! A contiguous block of phone numbers allocated to a telco.

use super::{Enterprise, License};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    /// Allocation status of a numbering resource
    pub enum ResourceStatus {
        #[default]
        Available => "AVAILABLE",
        Assigned => "ASSIGNED",
        InUse => "IN_USE",
        Revoked => "REVOKED",
        Quarantine => "QUARANTINE",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberRange {
    pub id: Uuid,
    pub prefix: String,
    pub start_number: String,
    pub end_number: String,
    pub block_size: i64,
    pub telco_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telco: Option<Enterprise>,
    pub license_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: ResourceStatus,
    pub created_at: DateTime<Utc>,
    pub usage_percent: Option<i32>,
}

impl NumberRange {
    /// Match a free-text term against the prefix, bounds and telco name
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.prefix.to_lowercase().contains(&term)
            || self.start_number.contains(&term)
            || self.end_number.contains(&term)
            || self
                .telco
                .as_ref()
                .is_some_and(|t| t.name.to_lowercase().contains(&term))
    }

    /// Estimated subscribers on this range from its usage percentage
    pub fn estimated_subscribers(&self) -> i64 {
        self.block_size * i64::from(self.usage_percent.unwrap_or(0)) / 100
    }
}

/// Number of numbers between two bounds, inclusive
///
/// Both bounds must be unsigned digit strings and `start <= end`.
/// Returns `None` when the size does not fit in an `i64`.
pub fn block_size(start: &str, end: &str) -> Option<i64> {
    let start = parse_bound(start)?;
    let end = parse_bound(end)?;
    if start > end {
        return None;
    }
    end.checked_sub(start)?.checked_add(1)
}

fn parse_bound(bound: &str) -> Option<i64> {
    let bound = bound.trim();
    if bound.is_empty() || !bound.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    bound.parse().ok()
}

/// Usage percentage of a block, capped at 100
pub fn usage_percent(bound: i64, block_size: i64) -> i32 {
    if block_size <= 0 {
        return 0;
    }
    (bound * 100 / block_size).clamp(0, 100) as i32
}
