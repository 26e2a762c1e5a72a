//! Dashboard read models

use super::{Application, ComplianceViolation};
use serde::{Deserialize, Serialize};

/// Headline counters shown on the dashboard cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_active_licenses: i64,
    pub total_number_ranges: i64,
    pub pending_applications: i64,
    pub new_violations: i64,
}

/// One point of a bar or pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub name: String,
    pub value: i64,
}

impl ChartData {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub recent_applications: Vec<Application>,
    pub recent_violations: Vec<ComplianceViolation>,
}
