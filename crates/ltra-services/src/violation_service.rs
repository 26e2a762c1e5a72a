//! Compliance violation tracking

use crate::audit::{actions, AuditService};
use ltra_cache::{keys, QueryCache};
use ltra_core::{
    models::{ComplianceViolation, ViolationStatus},
    traits::{Pagination, ViolationFilter, ViolationRepository},
    AppError, AppResult,
};
use ltra_db::Store;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const TARGET: &str = "compliance_violations";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationSummary {
    pub new: i64,
    pub investigating: i64,
    pub resolved: i64,
}

pub struct ViolationService {
    violations: Arc<dyn ViolationRepository>,
    audit: AuditService,
    cache: QueryCache,
}

impl ViolationService {
    pub fn new(store: &Store, audit: AuditService, cache: QueryCache) -> Self {
        Self {
            violations: store.violations.clone(),
            audit,
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ViolationFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<ComplianceViolation>, i64)> {
        self.violations
            .list_filtered(filter, pagination.limit(), pagination.offset())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<ComplianceViolation> {
        self.violations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Violation {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> AppResult<ViolationSummary> {
        let (new, investigating, resolved) = tokio::try_join!(
            self.violations.count_by_status(&[ViolationStatus::New]),
            self.violations
                .count_by_status(&[ViolationStatus::Investigating]),
            self.violations.count_by_status(&[ViolationStatus::Resolved]),
        )?;
        Ok(ViolationSummary {
            new,
            investigating,
            resolved,
        })
    }

    #[instrument(skip(self, violation))]
    pub async fn create(
        &self,
        violation: ComplianceViolation,
        actor: &str,
    ) -> AppResult<ComplianceViolation> {
        check_type(&violation)?;

        let row = ComplianceViolation {
            id: Uuid::new_v4(),
            license: None,
            enterprise: None,
            ..violation
        };
        let created = self.violations.create(&row).await?;
        info!(id = %created.id, severity = %created.severity, "Violation recorded");

        self.audit
            .record(
                actions::CREATE_VIOLATION,
                actor,
                TARGET,
                &created.id.to_string(),
                format!(
                    "Recorded {} violation: {}",
                    created.severity, created.violation_type
                ),
            )
            .await;
        self.cache.invalidate(keys::VIOLATIONS).await;
        Ok(created)
    }

    /// Replace a violation's fields, typically to move it through
    /// NEW, INVESTIGATING and RESOLVED
    #[instrument(skip(self, violation))]
    pub async fn update(
        &self,
        id: Uuid,
        violation: ComplianceViolation,
        actor: &str,
    ) -> AppResult<ComplianceViolation> {
        check_type(&violation)?;
        let current = self.get(id).await?;

        let row = ComplianceViolation {
            id,
            license: None,
            enterprise: None,
            ..violation
        };
        let updated = self.violations.update(&row).await?;
        info!(id = %id, from = %current.status, to = %updated.status, "Violation updated");

        self.audit
            .record(
                actions::UPDATE_VIOLATION,
                actor,
                TARGET,
                &id.to_string(),
                format!("Changed status from {} to {}", current.status, updated.status),
            )
            .await;
        self.cache.invalidate(keys::VIOLATIONS).await;
        Ok(updated)
    }
}

fn check_type(violation: &ComplianceViolation) -> AppResult<()> {
    if violation.violation_type.trim().is_empty() {
        return Err(AppError::Validation(
            "violation_type must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ltra_core::models::ViolationSeverity;
    use ltra_db::memory::seed::ids;

    fn service(store: &Store) -> ViolationService {
        ViolationService::new(
            store,
            AuditService::new(store.system_logs.clone()),
            QueryCache::disabled(),
        )
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let summary = service(&Store::seeded()).summary().await.unwrap();
        assert_eq!(
            summary,
            ViolationSummary {
                new: 1,
                investigating: 1,
                resolved: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_resolving_updates_summary() {
        let store = Store::seeded();
        let service = service(&store);
        let current = service.get(ids::violation(2)).await.unwrap();

        let updated = service
            .update(
                ids::violation(2),
                ComplianceViolation {
                    status: ViolationStatus::Resolved,
                    ..current
                },
                "reviewer@ltra.gov.la",
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ViolationStatus::Resolved);
        assert!(updated.enterprise.is_some());

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.investigating, 0);
        assert_eq!(summary.resolved, 1);

        let logs = store.system_logs.recent(1).await.unwrap();
        assert_eq!(logs[0].details, "Changed status from INVESTIGATING to RESOLVED");
    }

    #[tokio::test]
    async fn test_create_new_violation() {
        let store = Store::seeded();
        let created = service(&store)
            .create(
                ComplianceViolation {
                    detection_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                    enterprise_id: Some(ids::enterprise(4)),
                    violation_type: "Unregistered SIM".to_string(),
                    severity: ViolationSeverity::Critical,
                    ..Default::default()
                },
                "staff1@ltra.gov.la",
            )
            .await
            .unwrap();

        assert_eq!(created.status, ViolationStatus::New);
        let (listed, _) = service(&store)
            .list(&ViolationFilter::default(), &Pagination::new(1, 50))
            .await
            .unwrap();
        assert_eq!(listed[0].id, created.id);
    }
}
