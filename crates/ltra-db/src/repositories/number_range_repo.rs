//! Number range repository implementation
//!
//! Usage percent is derived from the subscribers bound to each range.

use super::search_pattern;
use ltra_core::{
    models::{Enterprise, License, NumberRange, ResourceStatus},
    traits::{NumberRangeFilter, NumberRangeRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SELECT_RANGE: &str = r#"
    SELECT
        r.id, r.prefix, r.start_number, r.end_number, r.block_size,
        r.telco_id, r.license_id, r.status, r.created_at,
        CASE WHEN r.block_size > 0 THEN
            LEAST(100, (SELECT COUNT(*) FROM subscribers s WHERE s.range_id = r.id) * 100 / r.block_size)::INT
        ELSE 0 END AS usage_percent,
        CASE WHEN e.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(e)) END AS telco,
        CASE WHEN l.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(l)) END AS license
    FROM number_ranges r
    LEFT JOIN enterprises e ON e.id = r.telco_id
    LEFT JOIN licenses l ON l.id = r.license_id
"#;

const FILTER_RANGE: &str = r#"
    WHERE ($1::TEXT IS NULL OR r.prefix ILIKE $1 ESCAPE '\'
           OR r.start_number ILIKE $1 ESCAPE '\' OR r.end_number ILIKE $1 ESCAPE '\'
           OR EXISTS (SELECT 1 FROM enterprises fe
                      WHERE fe.id = r.telco_id AND fe.name ILIKE $1 ESCAPE '\'))
      AND ($2::TEXT IS NULL OR r.status = $2)
      AND ($3::UUID IS NULL OR r.telco_id = $3)
"#;

/// PostgreSQL implementation of NumberRangeRepository
pub struct PgNumberRangeRepository {
    pool: PgPool,
}

impl PgNumberRangeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: Uuid) -> AppResult<NumberRange> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Number range {}", id)))
    }
}

#[async_trait]
impl Repository<NumberRange, Uuid> for PgNumberRangeRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NumberRange>> {
        debug!("Finding number range by id: {}", id);

        let row = sqlx::query_as::<_, NumberRangeRow>(&format!("{} WHERE r.id = $1", SELECT_RANGE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding number range {}: {}", id, e);
                AppError::Database(format!("Failed to find number range: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<NumberRange>> {
        let (items, _) = self
            .list_filtered(&NumberRangeFilter::default(), limit, offset)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM number_ranges")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting number ranges: {}", e);
                AppError::Database(format!("Failed to count number ranges: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &NumberRange) -> AppResult<NumberRange> {
        debug!("Allocating number range with prefix {}", entity.prefix);

        sqlx::query(
            r#"
            INSERT INTO number_ranges (
                id, prefix, start_number, end_number, block_size,
                telco_id, license_id, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entity.id)
        .bind(&entity.prefix)
        .bind(&entity.start_number)
        .bind(&entity.end_number)
        .bind(entity.block_size)
        .bind(entity.telco_id)
        .bind(entity.license_id)
        .bind(entity.status.as_str())
        .bind(entity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating number range: {}", e);
            AppError::Database(format!("Failed to create number range: {}", e))
        })?;

        self.fetch_one_by_id(entity.id).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &NumberRange) -> AppResult<NumberRange> {
        debug!("Updating number range: {}", entity.id);

        let result = sqlx::query(
            r#"
            UPDATE number_ranges
            SET prefix = $2,
                start_number = $3,
                end_number = $4,
                block_size = $5,
                telco_id = $6,
                license_id = $7,
                status = $8
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.prefix)
        .bind(&entity.start_number)
        .bind(&entity.end_number)
        .bind(entity.block_size)
        .bind(entity.telco_id)
        .bind(entity.license_id)
        .bind(entity.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating number range {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update number range: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Number range {}", entity.id)));
        }

        self.fetch_one_by_id(entity.id).await
    }
}

#[async_trait]
impl NumberRangeRepository for PgNumberRangeRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &NumberRangeFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<NumberRange>, i64)> {
        debug!(
            "Listing number ranges with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        let pattern = search_pattern(filter.search.as_deref());
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM number_ranges r {}",
            FILTER_RANGE
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(filter.telco_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting number ranges: {}", e);
            AppError::Database(format!("Failed to count number ranges: {}", e))
        })?;

        let rows = sqlx::query_as::<_, NumberRangeRow>(&format!(
            "{} {} ORDER BY r.prefix LIMIT $4 OFFSET $5",
            SELECT_RANGE, FILTER_RANGE
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(filter.telco_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing number ranges: {}", e);
            AppError::Database(format!("Failed to fetch number ranges: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: ResourceStatus) -> AppResult<NumberRange> {
        debug!("Setting number range {} status to {}", id, status);

        let result = sqlx::query("UPDATE number_ranges SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating number range status {}: {}", id, e);
                AppError::Database(format!("Failed to update number range: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Number range {}", id)));
        }

        self.fetch_one_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn allocated_by_telco(&self) -> AppResult<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT e.name, SUM(r.block_size)::BIGINT AS allocated
            FROM number_ranges r
            JOIN enterprises e ON e.id = r.telco_id
            WHERE r.status <> 'REVOKED'
            GROUP BY e.name
            ORDER BY allocated DESC, e.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error aggregating allocations: {}", e);
            AppError::Database(format!("Failed to aggregate allocations: {}", e))
        })?;

        Ok(rows)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct NumberRangeRow {
    id: Uuid,
    prefix: String,
    start_number: String,
    end_number: String,
    block_size: i64,
    telco_id: Option<Uuid>,
    license_id: Option<Uuid>,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    usage_percent: Option<i32>,
    telco: Option<Json<Enterprise>>,
    license: Option<Json<License>>,
}

impl From<NumberRangeRow> for NumberRange {
    fn from(row: NumberRangeRow) -> Self {
        Self {
            id: row.id,
            prefix: row.prefix,
            start_number: row.start_number,
            end_number: row.end_number,
            block_size: row.block_size,
            telco_id: row.telco_id,
            telco: row.telco.map(|j| j.0),
            license_id: row.license_id,
            license: row.license.map(|j| j.0),
            status: row
                .status
                .as_deref()
                .map(ResourceStatus::from_db)
                .unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            usage_percent: row.usage_percent,
        }
    }
}
