//! License repository implementation

use super::{is_unique_violation, search_pattern, status_strings};
use ltra_core::{
    models::{Enterprise, License, LicenseStatus, LicenseType},
    traits::{LicenseFilter, LicenseRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SELECT_LICENSE: &str = r#"
    SELECT
        l.id, l.license_number, l.enterprise_id, l.license_type_id,
        l.issue_date, l.expiry_date, l.status, l.file_url, l.created_at,
        CASE WHEN e.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(e)) END AS enterprise,
        CASE WHEN t.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(t)) END AS license_type
    FROM licenses l
    LEFT JOIN enterprises e ON e.id = l.enterprise_id
    LEFT JOIN license_types t ON t.id = l.license_type_id
"#;

const FILTER_LICENSE: &str = r#"
    WHERE ($1::TEXT IS NULL OR l.license_number ILIKE $1 ESCAPE '\'
           OR EXISTS (SELECT 1 FROM enterprises fe
                      WHERE fe.id = l.enterprise_id AND fe.name ILIKE $1 ESCAPE '\'))
      AND ($2::TEXT IS NULL OR l.status = $2)
      AND ($3::UUID IS NULL OR l.enterprise_id = $3)
"#;

/// PostgreSQL implementation of LicenseRepository
pub struct PgLicenseRepository {
    pool: PgPool,
}

impl PgLicenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: Uuid) -> AppResult<License> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("License {}", id)))
    }
}

#[async_trait]
impl Repository<License, Uuid> for PgLicenseRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<License>> {
        debug!("Finding license by id: {}", id);

        let row = sqlx::query_as::<_, LicenseRow>(&format!("{} WHERE l.id = $1", SELECT_LICENSE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding license {}: {}", id, e);
                AppError::Database(format!("Failed to find license: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<License>> {
        let (items, _) = self
            .list_filtered(&LicenseFilter::default(), limit, offset)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM licenses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting licenses: {}", e);
                AppError::Database(format!("Failed to count licenses: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &License) -> AppResult<License> {
        debug!("Creating license: {}", entity.license_number);

        sqlx::query(
            r#"
            INSERT INTO licenses (
                id, license_number, enterprise_id, license_type_id,
                issue_date, expiry_date, status, file_url, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entity.id)
        .bind(&entity.license_number)
        .bind(entity.enterprise_id)
        .bind(entity.license_type_id)
        .bind(entity.issue_date)
        .bind(entity.expiry_date)
        .bind(entity.status.as_str())
        .bind(&entity.file_url)
        .bind(entity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating license: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!(
                    "License {} already exists",
                    entity.license_number
                ))
            } else {
                AppError::Database(format!("Failed to create license: {}", e))
            }
        })?;

        self.fetch_one_by_id(entity.id).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &License) -> AppResult<License> {
        debug!("Updating license: {}", entity.id);

        let result = sqlx::query(
            r#"
            UPDATE licenses
            SET license_number = $2,
                enterprise_id = $3,
                license_type_id = $4,
                issue_date = $5,
                expiry_date = $6,
                status = $7,
                file_url = $8
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.license_number)
        .bind(entity.enterprise_id)
        .bind(entity.license_type_id)
        .bind(entity.issue_date)
        .bind(entity.expiry_date)
        .bind(entity.status.as_str())
        .bind(&entity.file_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating license {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update license: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("License {}", entity.id)));
        }

        self.fetch_one_by_id(entity.id).await
    }
}

#[async_trait]
impl LicenseRepository for PgLicenseRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &LicenseFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<License>, i64)> {
        debug!(
            "Listing licenses with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        let pattern = search_pattern(filter.search.as_deref());
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM licenses l {}",
            FILTER_LICENSE
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(filter.enterprise_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting licenses: {}", e);
            AppError::Database(format!("Failed to count licenses: {}", e))
        })?;

        let rows = sqlx::query_as::<_, LicenseRow>(&format!(
            "{} {} ORDER BY l.created_at DESC LIMIT $4 OFFSET $5",
            SELECT_LICENSE, FILTER_LICENSE
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(filter.enterprise_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing licenses: {}", e);
            AppError::Database(format!("Failed to fetch licenses: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, statuses: &[LicenseStatus]) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM licenses WHERE status = ANY($1)")
            .bind(status_strings(statuses))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting licenses by status: {}", e);
                AppError::Database(format!("Failed to count licenses: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_issued_by_month(&self, year: i32) -> AppResult<Vec<(u32, i64)>> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT EXTRACT(MONTH FROM issue_date)::INT AS month, COUNT(*) AS issued
            FROM licenses
            WHERE EXTRACT(YEAR FROM issue_date)::INT = $1
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting licenses per month: {}", e);
            AppError::Database(format!("Failed to count licenses per month: {}", e))
        })?;

        Ok(rows
            .into_iter()
            .map(|(month, issued)| (month as u32, issued))
            .collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct LicenseRow {
    id: Uuid,
    license_number: String,
    enterprise_id: Option<Uuid>,
    license_type_id: Option<Uuid>,
    issue_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    status: Option<String>,
    file_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    enterprise: Option<Json<Enterprise>>,
    license_type: Option<Json<LicenseType>>,
}

impl From<LicenseRow> for License {
    fn from(row: LicenseRow) -> Self {
        Self {
            id: row.id,
            license_number: row.license_number,
            enterprise_id: row.enterprise_id.unwrap_or_default(),
            enterprise: row.enterprise.map(|j| j.0),
            license_type_id: row.license_type_id,
            license_type: row.license_type.map(|j| j.0),
            issue_date: row.issue_date.unwrap_or_default(),
            expiry_date: row.expiry_date,
            status: row
                .status
                .as_deref()
                .map(LicenseStatus::from_db)
                .unwrap_or_default(),
            file_url: row.file_url,
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}
