//! Reference catalogue repository implementation
//!
//! Enterprise, service, license and resource types, each listed by name.

use super::is_unique_violation;
use ltra_core::{
    models::{
        EnterpriseType, LicenseCategory, LicenseType, ResourceType, ServiceGroup, ServiceType,
        Status,
    },
    traits::CatalogRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of CatalogRepository
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn status_of(row: &PgRow) -> Status {
        row.get::<Option<String>, _>("status")
            .as_deref()
            .map(Status::from_db)
            .unwrap_or_default()
    }

    fn map_service_type(row: PgRow) -> ServiceType {
        ServiceType {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("name"),
            group_type: row
                .get::<Option<String>, _>("group_type")
                .as_deref()
                .map(ServiceGroup::from_db)
                .unwrap_or_default(),
            requires_license: row.get::<Option<bool>, _>("requires_license").unwrap_or(true),
            status: Self::status_of(&row),
        }
    }

    fn map_license_type(row: PgRow) -> LicenseType {
        LicenseType {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("name"),
            category: row
                .get::<Option<String>, _>("category")
                .as_deref()
                .map(LicenseCategory::from_db)
                .unwrap_or_default(),
            has_expiry: row.get::<Option<bool>, _>("has_expiry").unwrap_or(true),
            status: Self::status_of(&row),
        }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn list_enterprise_types(&self) -> AppResult<Vec<EnterpriseType>> {
        debug!("Listing enterprise types");

        let rows = sqlx::query(
            "SELECT id, code, name, status, created_at FROM enterprise_types ORDER BY name",
        )
        .map(|row: PgRow| EnterpriseType {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("name"),
            status: Self::status_of(&row),
            created_at: row
                .get::<Option<chrono::DateTime<chrono::Utc>>, _>("created_at")
                .unwrap_or_default(),
        })
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing enterprise types: {}", e);
            AppError::Database(format!("Failed to fetch enterprise types: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn list_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        debug!("Listing resource types");

        let rows = sqlx::query(
            "SELECT id, code, name, format_rule, status FROM resource_types ORDER BY name",
        )
        .map(|row: PgRow| ResourceType {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("name"),
            format_rule: row
                .get::<Option<String>, _>("format_rule")
                .unwrap_or_default(),
            status: Self::status_of(&row),
        })
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing resource types: {}", e);
            AppError::Database(format!("Failed to fetch resource types: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn list_service_types(&self) -> AppResult<Vec<ServiceType>> {
        debug!("Listing service types");

        let rows = sqlx::query(
            r#"
            SELECT id, code, name, group_type, requires_license, status
            FROM service_types
            ORDER BY name
            "#,
        )
        .map(Self::map_service_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing service types: {}", e);
            AppError::Database(format!("Failed to fetch service types: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_service_type(&self, id: Uuid) -> AppResult<Option<ServiceType>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, group_type, requires_license, status
            FROM service_types
            WHERE id = $1
            "#,
        )
        .bind(id)
        .map(Self::map_service_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding service type {}: {}", id, e);
            AppError::Database(format!("Failed to find service type: {}", e))
        })?;

        Ok(row)
    }

    #[instrument(skip(self, item))]
    async fn create_service_type(&self, item: &ServiceType) -> AppResult<ServiceType> {
        debug!("Creating service type: {}", item.code);

        let row = sqlx::query(
            r#"
            INSERT INTO service_types (id, code, name, group_type, requires_license, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, code, name, group_type, requires_license, status
            "#,
        )
        .bind(item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.group_type.as_str())
        .bind(item.requires_license)
        .bind(item.status.as_str())
        .map(Self::map_service_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating service type: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!("Service type {} already exists", item.code))
            } else {
                AppError::Database(format!("Failed to create service type: {}", e))
            }
        })?;

        Ok(row)
    }

    #[instrument(skip(self, item))]
    async fn update_service_type(&self, item: &ServiceType) -> AppResult<ServiceType> {
        debug!("Updating service type: {}", item.id);

        let row = sqlx::query(
            r#"
            UPDATE service_types
            SET code = $2, name = $3, group_type = $4, requires_license = $5, status = $6
            WHERE id = $1
            RETURNING id, code, name, group_type, requires_license, status
            "#,
        )
        .bind(item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.group_type.as_str())
        .bind(item.requires_license)
        .bind(item.status.as_str())
        .map(Self::map_service_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating service type {}: {}", item.id, e);
            AppError::Database(format!("Failed to update service type: {}", e))
        })?;

        row.ok_or_else(|| AppError::NotFound(format!("Service type {}", item.id)))
    }

    #[instrument(skip(self))]
    async fn list_license_types(&self) -> AppResult<Vec<LicenseType>> {
        debug!("Listing license types");

        let rows = sqlx::query(
            r#"
            SELECT id, code, name, category, has_expiry, status
            FROM license_types
            ORDER BY name
            "#,
        )
        .map(Self::map_license_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing license types: {}", e);
            AppError::Database(format!("Failed to fetch license types: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_license_type(&self, id: Uuid) -> AppResult<Option<LicenseType>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, category, has_expiry, status
            FROM license_types
            WHERE id = $1
            "#,
        )
        .bind(id)
        .map(Self::map_license_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding license type {}: {}", id, e);
            AppError::Database(format!("Failed to find license type: {}", e))
        })?;

        Ok(row)
    }

    #[instrument(skip(self, item))]
    async fn create_license_type(&self, item: &LicenseType) -> AppResult<LicenseType> {
        debug!("Creating license type: {}", item.code);

        let row = sqlx::query(
            r#"
            INSERT INTO license_types (id, code, name, category, has_expiry, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, code, name, category, has_expiry, status
            "#,
        )
        .bind(item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.category.as_str())
        .bind(item.has_expiry)
        .bind(item.status.as_str())
        .map(Self::map_license_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating license type: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!("License type {} already exists", item.code))
            } else {
                AppError::Database(format!("Failed to create license type: {}", e))
            }
        })?;

        Ok(row)
    }

    #[instrument(skip(self, item))]
    async fn update_license_type(&self, item: &LicenseType) -> AppResult<LicenseType> {
        debug!("Updating license type: {}", item.id);

        let row = sqlx::query(
            r#"
            UPDATE license_types
            SET code = $2, name = $3, category = $4, has_expiry = $5, status = $6
            WHERE id = $1
            RETURNING id, code, name, category, has_expiry, status
            "#,
        )
        .bind(item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.category.as_str())
        .bind(item.has_expiry)
        .bind(item.status.as_str())
        .map(Self::map_license_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating license type {}: {}", item.id, e);
            AppError::Database(format!("Failed to update license type: {}", e))
        })?;

        row.ok_or_else(|| AppError::NotFound(format!("License type {}", item.id)))
    }
}
