//! Reference catalogue: enterprise, service, license and resource types
//!
//! Enterprise and resource types are read-only here. Service and license
//! types can be added and edited from the settings page.

use crate::audit::{actions, AuditService};
use ltra_core::{
    models::{EnterpriseType, LicenseType, ResourceType, ServiceType},
    traits::CatalogRepository,
    AppError, AppResult,
};
use ltra_db::Store;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    audit: AuditService,
}

impl CatalogService {
    pub fn new(store: &Store, audit: AuditService) -> Self {
        Self {
            catalog: store.catalog.clone(),
            audit,
        }
    }

    pub async fn enterprise_types(&self) -> AppResult<Vec<EnterpriseType>> {
        self.catalog.list_enterprise_types().await
    }

    pub async fn resource_types(&self) -> AppResult<Vec<ResourceType>> {
        self.catalog.list_resource_types().await
    }

    pub async fn service_types(&self) -> AppResult<Vec<ServiceType>> {
        self.catalog.list_service_types().await
    }

    pub async fn license_types(&self) -> AppResult<Vec<LicenseType>> {
        self.catalog.list_license_types().await
    }

    #[instrument(skip(self, item), fields(code = %item.code))]
    pub async fn create_service_type(
        &self,
        item: ServiceType,
        actor: &str,
    ) -> AppResult<ServiceType> {
        check_entry(&item.code, &item.name)?;
        let row = ServiceType {
            id: Uuid::new_v4(),
            code: item.code.trim().to_uppercase(),
            ..item
        };
        let created = self.catalog.create_service_type(&row).await?;
        self.saved("service_types", &created.id, &created.code, actor)
            .await;
        Ok(created)
    }

    #[instrument(skip(self, item))]
    pub async fn update_service_type(
        &self,
        id: Uuid,
        item: ServiceType,
        actor: &str,
    ) -> AppResult<ServiceType> {
        check_entry(&item.code, &item.name)?;
        if self.catalog.find_service_type(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Service type {}", id)));
        }
        let row = ServiceType {
            id,
            code: item.code.trim().to_uppercase(),
            ..item
        };
        let updated = self.catalog.update_service_type(&row).await?;
        self.saved("service_types", &updated.id, &updated.code, actor)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, item), fields(code = %item.code))]
    pub async fn create_license_type(
        &self,
        item: LicenseType,
        actor: &str,
    ) -> AppResult<LicenseType> {
        check_entry(&item.code, &item.name)?;
        let row = LicenseType {
            id: Uuid::new_v4(),
            code: item.code.trim().to_uppercase(),
            ..item
        };
        let created = self.catalog.create_license_type(&row).await?;
        self.saved("license_types", &created.id, &created.code, actor)
            .await;
        Ok(created)
    }

    #[instrument(skip(self, item))]
    pub async fn update_license_type(
        &self,
        id: Uuid,
        item: LicenseType,
        actor: &str,
    ) -> AppResult<LicenseType> {
        check_entry(&item.code, &item.name)?;
        if self.catalog.find_license_type(id).await?.is_none() {
            return Err(AppError::NotFound(format!("License type {}", id)));
        }
        let row = LicenseType {
            id,
            code: item.code.trim().to_uppercase(),
            ..item
        };
        let updated = self.catalog.update_license_type(&row).await?;
        self.saved("license_types", &updated.id, &updated.code, actor)
            .await;
        Ok(updated)
    }

    async fn saved(&self, table: &str, id: &Uuid, code: &str, actor: &str) {
        info!(table, code, "Catalogue entry saved");
        self.audit
            .record(
                actions::SAVE_CATALOG,
                actor,
                table,
                &id.to_string(),
                format!("Saved {} {}", table, code),
            )
            .await;
    }
}

fn check_entry(code: &str, name: &str) -> AppResult<()> {
    if code.trim().is_empty() || name.trim().is_empty() {
        return Err(AppError::Validation(
            "code and name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_core::models::{ServiceGroup, Status};
    use ltra_db::memory::seed::ids;

    fn service(store: &Store) -> CatalogService {
        CatalogService::new(store, AuditService::new(store.system_logs.clone()))
    }

    #[tokio::test]
    async fn test_lists_are_sorted_by_name() {
        let store = Store::seeded();
        let types = service(&store).service_types().await.unwrap();

        assert_eq!(types.len(), 5);
        assert!(types.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[tokio::test]
    async fn test_create_service_type_normalises_code() {
        let store = Store::seeded();
        let created = service(&store)
            .create_service_type(
                ServiceType {
                    code: " iptv ".to_string(),
                    name: "Truyền hình IP".to_string(),
                    group_type: ServiceGroup::Ott,
                    status: Status::Active,
                    ..Default::default()
                },
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();

        assert_eq!(created.code, "IPTV");
        assert_eq!(service(&store).service_types().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let store = Store::seeded();
        let err = service(&store)
            .create_service_type(
                ServiceType {
                    code: "mobile".to_string(),
                    name: "Duplicate".to_string(),
                    ..Default::default()
                },
                "x",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_license_type() {
        let store = Store::seeded();
        let service = service(&store);
        let current = store
            .catalog
            .find_license_type(ids::license_type(4))
            .await
            .unwrap()
            .unwrap();

        let updated = service
            .update_license_type(
                ids::license_type(4),
                LicenseType {
                    has_expiry: false,
                    ..current
                },
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();
        assert!(!updated.has_expiry);

        let err = service
            .update_license_type(Uuid::new_v4(), updated, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
