//! Enterprise repository implementation

use super::{is_unique_violation, search_pattern};
use ltra_core::{
    models::{Enterprise, EnterpriseType, Status},
    traits::{EnterpriseFilter, EnterpriseRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SELECT_ENTERPRISE: &str = r#"
    SELECT
        e.id, e.name, e.tax_code, e.representative, e.enterprise_type_id,
        e.status, e.created_at,
        CASE WHEN t.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(t)) END AS enterprise_type
    FROM enterprises e
    LEFT JOIN enterprise_types t ON t.id = e.enterprise_type_id
"#;

/// PostgreSQL implementation of EnterpriseRepository
pub struct PgEnterpriseRepository {
    pool: PgPool,
}

impl PgEnterpriseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: Uuid) -> AppResult<Enterprise> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enterprise {}", id)))
    }
}

#[async_trait]
impl Repository<Enterprise, Uuid> for PgEnterpriseRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enterprise>> {
        debug!("Finding enterprise by id: {}", id);

        let row = sqlx::query_as::<_, EnterpriseRow>(&format!("{} WHERE e.id = $1", SELECT_ENTERPRISE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding enterprise {}: {}", id, e);
                AppError::Database(format!("Failed to find enterprise: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Enterprise>> {
        let (items, _) = self
            .list_filtered(&EnterpriseFilter::default(), limit, offset)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enterprises")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting enterprises: {}", e);
                AppError::Database(format!("Failed to count enterprises: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Enterprise) -> AppResult<Enterprise> {
        debug!("Creating enterprise: {}", entity.name);

        sqlx::query(
            r#"
            INSERT INTO enterprises (
                id, name, tax_code, representative, enterprise_type_id, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.tax_code)
        .bind(&entity.representative)
        .bind(entity.enterprise_type_id)
        .bind(entity.status.as_str())
        .bind(entity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating enterprise: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!("Enterprise {} already exists", entity.tax_code))
            } else {
                AppError::Database(format!("Failed to create enterprise: {}", e))
            }
        })?;

        self.fetch_one_by_id(entity.id).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Enterprise) -> AppResult<Enterprise> {
        debug!("Updating enterprise: {}", entity.id);

        let result = sqlx::query(
            r#"
            UPDATE enterprises
            SET name = $2,
                tax_code = $3,
                representative = $4,
                enterprise_type_id = $5,
                status = $6
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.tax_code)
        .bind(&entity.representative)
        .bind(entity.enterprise_type_id)
        .bind(entity.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating enterprise {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update enterprise: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Enterprise {}", entity.id)));
        }

        self.fetch_one_by_id(entity.id).await
    }
}

#[async_trait]
impl EnterpriseRepository for PgEnterpriseRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &EnterpriseFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Enterprise>, i64)> {
        debug!(
            "Listing enterprises with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        let pattern = search_pattern(filter.search.as_deref());
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM enterprises e
            WHERE ($1::TEXT IS NULL OR e.name ILIKE $1 ESCAPE '\' OR e.tax_code ILIKE $1 ESCAPE '\')
              AND ($2::TEXT IS NULL OR e.status = $2)
            "#,
        )
        .bind(pattern.as_deref())
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting enterprises: {}", e);
            AppError::Database(format!("Failed to count enterprises: {}", e))
        })?;

        let rows = sqlx::query_as::<_, EnterpriseRow>(&format!(
            r#"{}
            WHERE ($1::TEXT IS NULL OR e.name ILIKE $1 ESCAPE '\' OR e.tax_code ILIKE $1 ESCAPE '\')
              AND ($2::TEXT IS NULL OR e.status = $2)
            ORDER BY e.name
            LIMIT $3 OFFSET $4
            "#,
            SELECT_ENTERPRISE
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing enterprises: {}", e);
            AppError::Database(format!("Failed to fetch enterprises: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct EnterpriseRow {
    id: Uuid,
    name: String,
    tax_code: Option<String>,
    representative: Option<String>,
    enterprise_type_id: Option<Uuid>,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    enterprise_type: Option<Json<EnterpriseType>>,
}

impl From<EnterpriseRow> for Enterprise {
    fn from(row: EnterpriseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            tax_code: row.tax_code.unwrap_or_default(),
            representative: row.representative.unwrap_or_default(),
            enterprise_type_id: row.enterprise_type_id,
            enterprise_type: row.enterprise_type.map(|j| j.0),
            status: row.status.as_deref().map(Status::from_db).unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}
