//! License registry

use crate::audit::{actions, AuditService};
use crate::page_params;
use chrono::Utc;
use ltra_cache::{keys, QueryCache};
use ltra_core::{
    models::{License, LicenseStatus},
    traits::{LicenseFilter, LicenseRepository, Pagination},
    AppError, AppResult,
};
use ltra_db::Store;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const TARGET: &str = "licenses";

/// Counters shown above the license list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseSummary {
    pub active: i64,
    pub expired: i64,
}

pub struct LicenseService {
    licenses: Arc<dyn LicenseRepository>,
    audit: AuditService,
    cache: QueryCache,
}

impl LicenseService {
    pub fn new(store: &Store, audit: AuditService, cache: QueryCache) -> Self {
        Self {
            licenses: store.licenses.clone(),
            audit,
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &LicenseFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<License>, i64)> {
        let fetch = || {
            self.licenses
                .list_filtered(filter, pagination.limit(), pagination.offset())
        };

        let unfiltered =
            filter.search.is_none() && filter.status.is_none() && filter.enterprise_id.is_none();
        if unfiltered {
            let key = keys::list_key(keys::LICENSES, Some(&page_params(pagination)));
            self.cache.get_or_fetch(&key, fetch).await
        } else {
            fetch().await
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<License> {
        self.licenses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("License {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> AppResult<LicenseSummary> {
        let (active, expired) = tokio::try_join!(
            self.licenses.count_by_status(&[LicenseStatus::Active]),
            self.licenses.count_by_status(&[LicenseStatus::Expired]),
        )?;
        Ok(LicenseSummary { active, expired })
    }

    /// Issue a license; the license number must be unique
    #[instrument(skip(self, license), fields(number = %license.license_number))]
    pub async fn create(&self, license: License, actor: &str) -> AppResult<License> {
        check_license(&license)?;

        let row = License {
            id: Uuid::new_v4(),
            license_number: license.license_number.trim().to_string(),
            created_at: Utc::now(),
            enterprise: None,
            license_type: None,
            ..license
        };
        let created = self.licenses.create(&row).await?;
        info!(id = %created.id, status = %created.status, "License issued");

        self.audit
            .record(
                actions::CREATE_LICENSE,
                actor,
                TARGET,
                &created.id.to_string(),
                format!("Issued license {}", created.license_number),
            )
            .await;
        self.cache.invalidate(keys::LICENSES).await;
        Ok(created)
    }

    #[instrument(skip(self, license))]
    pub async fn update(&self, id: Uuid, license: License, actor: &str) -> AppResult<License> {
        check_license(&license)?;
        let current = self.get(id).await?;

        let row = License {
            id,
            license_number: license.license_number.trim().to_string(),
            created_at: current.created_at,
            enterprise: None,
            license_type: None,
            ..license
        };
        let updated = self.licenses.update(&row).await?;
        info!(id = %id, from = %current.status, to = %updated.status, "License updated");

        self.audit
            .record(
                actions::UPDATE_LICENSE,
                actor,
                TARGET,
                &id.to_string(),
                format!("Updated license {}", updated.license_number),
            )
            .await;
        self.cache.invalidate(keys::LICENSES).await;
        Ok(updated)
    }
}

fn check_license(license: &License) -> AppResult<()> {
    if license.license_number.trim().is_empty() {
        return Err(AppError::Validation(
            "license_number must not be empty".to_string(),
        ));
    }
    if let Some(expiry) = license.expiry_date {
        if expiry < license.issue_date {
            return Err(AppError::Validation(
                "expiry_date must not be before issue_date".to_string(),
            ));
        }
    }
    Ok(())
}
