use crate::audit::{actions, AuditService};
use chrono::Utc;
use ltra_cache::{keys, QueryCache};
use ltra_core::{
    models::Enterprise,
    traits::{EnterpriseFilter, EnterpriseRepository, Pagination},
    AppError, AppResult,
};
use ltra_db::Store;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const TARGET: &str = "enterprises";

/// Registered enterprises (telcos and service providers)
pub struct EnterpriseService {
    enterprises: Arc<dyn EnterpriseRepository>,
    audit: AuditService,
    cache: QueryCache,
}

impl EnterpriseService {
    pub fn new(store: &Store, audit: AuditService, cache: QueryCache) -> Self {
        Self {
            enterprises: store.enterprises.clone(),
            audit,
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &EnterpriseFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Enterprise>, i64)> {
        self.enterprises
            .list_filtered(filter, pagination.limit(), pagination.offset())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<Enterprise> {
        self.enterprises
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enterprise {}", id)))
    }

    #[instrument(skip(self, enterprise), fields(name = %enterprise.name))]
    pub async fn create(&self, enterprise: Enterprise, actor: &str) -> AppResult<Enterprise> {
        check_name(&enterprise.name)?;

        let row = Enterprise {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            enterprise_type: None,
            ..enterprise
        };
        let created = self.enterprises.create(&row).await?;
        info!(id = %created.id, "Enterprise registered");

        self.audit
            .record(
                actions::CREATE_ENTERPRISE,
                actor,
                TARGET,
                &created.id.to_string(),
                format!("Registered enterprise {}", created.name),
            )
            .await;
        self.cache.invalidate(keys::ENTERPRISES).await;
        Ok(created)
    }

    /// Replace the editable fields of an enterprise; id and creation time are kept
    #[instrument(skip(self, enterprise))]
    pub async fn update(
        &self,
        id: Uuid,
        enterprise: Enterprise,
        actor: &str,
    ) -> AppResult<Enterprise> {
        check_name(&enterprise.name)?;
        let current = self.get(id).await?;

        let row = Enterprise {
            id,
            created_at: current.created_at,
            enterprise_type: None,
            ..enterprise
        };
        let updated = self.enterprises.update(&row).await?;
        info!(id = %id, status = %updated.status, "Enterprise updated");

        self.audit
            .record(
                actions::UPDATE_ENTERPRISE,
                actor,
                TARGET,
                &id.to_string(),
                format!("Updated enterprise {}", updated.name),
            )
            .await;
        // Lists embedding this enterprise carry its old name and status
        self.cache.invalidate(keys::ENTERPRISES).await;
        Ok(updated)
    }
}

fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_core::models::Status;
    use ltra_db::memory::seed::ids;

    fn service(store: &Store) -> EnterpriseService {
        EnterpriseService::new(
            store,
            AuditService::new(store.system_logs.clone()),
            QueryCache::disabled(),
        )
    }

    #[tokio::test]
    async fn test_create_and_search() {
        let store = Store::seeded();
        let service = service(&store);

        let created = service
            .create(
                Enterprise {
                    name: "Best Telecom".to_string(),
                    tax_code: "0100999999999".to_string(),
                    enterprise_type_id: Some(ids::enterprise_type(1)),
                    status: Status::Active,
                    ..Default::default()
                },
                "staff1@ltra.gov.la",
            )
            .await
            .unwrap();
        assert!(created.enterprise_type.is_some());

        let filter = EnterpriseFilter {
            search: Some("best".to_string()),
            ..Default::default()
        };
        let (found, total) = service.list(&filter, &Pagination::new(1, 50)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].id, created.id);
    }

    #[tokio::test]
    async fn test_update_keeps_creation_time() {
        let store = Store::seeded();
        let service = service(&store);
        let before = service.get(ids::enterprise(4)).await.unwrap();

        let updated = service
            .update(
                ids::enterprise(4),
                Enterprise {
                    status: Status::Suspended,
                    ..before.clone()
                },
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();

        assert_eq!(updated.status, Status::Suspended);
        assert_eq!(updated.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_update_writes_system_log() {
        let store = Store::seeded();
        let service = service(&store);
        let before = service.get(ids::enterprise(1)).await.unwrap();

        service
            .update(ids::enterprise(1), before, "admin@ltra.gov.la")
            .await
            .unwrap();

        let logs = store.system_logs.recent(1).await.unwrap();
        assert_eq!(logs[0].action, actions::UPDATE_ENTERPRISE);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_rename_refreshes_cached_application_list() {
        use crate::application_service::ApplicationService;
        use ltra_cache::RedisCache;
        use ltra_core::traits::ApplicationFilter;

        let redis = RedisCache::new("redis://127.0.0.1:6379").await.unwrap();
        redis.delete_pattern("applications:*").await.unwrap();
        let cache = QueryCache::new(redis, 30);

        let store = Store::seeded();
        let audit = AuditService::new(store.system_logs.clone());
        let enterprises = EnterpriseService::new(&store, audit.clone(), cache.clone());
        let applications = ApplicationService::new(&store, audit, cache);

        let enterprise_name = |apps: &[ltra_core::models::Application]| {
            apps.iter()
                .find(|a| a.enterprise_id == ids::enterprise(1))
                .and_then(|a| a.enterprise.as_ref())
                .map(|e| e.name.clone())
        };
        let page = Pagination::new(1, 50);
        let (cached, _) = applications
            .list(&ApplicationFilter::default(), &page)
            .await
            .unwrap();
        assert!(enterprise_name(&cached).is_some());

        let current = enterprises.get(ids::enterprise(1)).await.unwrap();
        enterprises
            .update(
                ids::enterprise(1),
                Enterprise {
                    name: "Renamed Telecom".to_string(),
                    ..current
                },
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();

        let (fresh, _) = applications
            .list(&ApplicationFilter::default(), &page)
            .await
            .unwrap();
        assert_eq!(enterprise_name(&fresh).as_deref(), Some("Renamed Telecom"));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let store = Store::seeded();
        let err = service(&store)
            .create(Enterprise::default(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_enterprise_is_not_found() {
        let store = Store::seeded();
        let err = service(&store).get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
