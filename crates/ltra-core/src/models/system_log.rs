//! System log (audit trail) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemLog {
    pub id: Uuid,
    pub action: String,
    pub actor: String,
    pub target_entity: String,
    pub target_id: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when recording an action
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSystemLog {
    pub action: String,
    pub actor: String,
    pub target_entity: String,
    pub target_id: String,
    pub details: String,
}
