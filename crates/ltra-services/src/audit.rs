//! System log writer
//!
//! Mutations record what they did through [`AuditService::record`]. A
//! failed insert is logged and dropped so it never fails the mutation
//! that triggered it.

use crate::constants::SYSTEM_LOG_LIMIT;
use ltra_core::{
    models::{NewSystemLog, SystemLog},
    traits::SystemLogRepository,
    AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// System log action names
pub mod actions {
    pub const CREATE_APPLICATION: &str = "CREATE_APPLICATION";
    pub const UPDATE_STATUS: &str = "UPDATE_STATUS";
    pub const ALLOCATE_RANGE: &str = "ALLOCATE_RANGE";
    pub const REVOKE_RANGE: &str = "REVOKE_RANGE";
    pub const UPLOAD_DATA: &str = "UPLOAD_DATA";
    pub const CREATE_ENTERPRISE: &str = "CREATE_ENTERPRISE";
    pub const UPDATE_ENTERPRISE: &str = "UPDATE_ENTERPRISE";
    pub const CREATE_LICENSE: &str = "CREATE_LICENSE";
    pub const UPDATE_LICENSE: &str = "UPDATE_LICENSE";
    pub const CREATE_VIOLATION: &str = "CREATE_VIOLATION";
    pub const UPDATE_VIOLATION: &str = "UPDATE_VIOLATION";
    pub const SAVE_CATALOG: &str = "SAVE_CATALOG";
    pub const GRANT_PERMISSION: &str = "GRANT_PERMISSION";
    pub const REVOKE_PERMISSION: &str = "REVOKE_PERMISSION";
    pub const ASSIGN_ROLE: &str = "ASSIGN_ROLE";
    pub const REMOVE_ROLE: &str = "REMOVE_ROLE";
    pub const CREATE_USER: &str = "CREATE_USER";
    pub const UPDATE_USER: &str = "UPDATE_USER";
    pub const CHANGE_PASSWORD: &str = "CHANGE_PASSWORD";
}

#[derive(Clone)]
pub struct AuditService {
    logs: Arc<dyn SystemLogRepository>,
}

impl AuditService {
    pub fn new(logs: Arc<dyn SystemLogRepository>) -> Self {
        Self { logs }
    }

    /// Write a log entry; failures are logged at `warn` and swallowed
    #[instrument(skip(self, details))]
    pub async fn record(
        &self,
        action: &str,
        actor: &str,
        target_entity: &str,
        target_id: &str,
        details: String,
    ) {
        let entry = NewSystemLog {
            action: action.to_string(),
            actor: actor.to_string(),
            target_entity: target_entity.to_string(),
            target_id: target_id.to_string(),
            details,
        };

        match self.logs.create(&entry).await {
            Ok(log) => debug!(id = %log.id, "System log written"),
            Err(e) => warn!(error = %e, "Failed to write system log"),
        }
    }

    /// Latest entries, newest first
    pub async fn recent(&self) -> AppResult<Vec<SystemLog>> {
        self.logs.recent(SYSTEM_LOG_LIMIT).await
    }

    /// Insert an entry supplied by a client
    pub async fn create(&self, entry: &NewSystemLog) -> AppResult<SystemLog> {
        self.logs.create(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ltra_core::AppError;
    use ltra_db::MemoryStore;

    struct BrokenLogs;

    #[async_trait]
    impl SystemLogRepository for BrokenLogs {
        async fn recent(&self, _limit: i64) -> AppResult<Vec<SystemLog>> {
            Err(AppError::Database("unavailable".to_string()))
        }

        async fn create(&self, _entry: &NewSystemLog) -> AppResult<SystemLog> {
            Err(AppError::Database("unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_record_swallows_storage_errors() {
        let audit = AuditService::new(Arc::new(BrokenLogs));
        audit
            .record(
                actions::UPDATE_STATUS,
                "reviewer@ltra.gov.la",
                "applications",
                "1",
                "Changed status from DRAFT to SUBMITTED".to_string(),
            )
            .await;
        assert!(audit.recent().await.is_err());
    }

    #[tokio::test]
    async fn test_record_appears_first_in_recent() {
        let audit = AuditService::new(Arc::new(MemoryStore::seeded()));
        audit
            .record(
                actions::UPLOAD_DATA,
                "staff1@ltra.gov.la",
                "uploads",
                "usage.csv",
                "Uploaded usage.csv".to_string(),
            )
            .await;

        let logs = audit.recent().await.unwrap();
        assert_eq!(logs.len(), 5);
        assert_eq!(logs[0].action, actions::UPLOAD_DATA);
        assert_eq!(logs[0].actor, "staff1@ltra.gov.la");
    }
}
