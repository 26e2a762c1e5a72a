//! Compliance violation repository implementation

use super::{search_pattern, status_strings};
use ltra_core::{
    models::{
        ComplianceViolation, Enterprise, License, ViolationSeverity, ViolationStatus,
    },
    traits::{Repository, ViolationFilter, ViolationRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SELECT_VIOLATION: &str = r#"
    SELECT
        v.id, v.detection_date, v.license_id, v.enterprise_id,
        v.violation_type, v.description, v.severity, v.status,
        CASE WHEN l.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(l)) END AS license,
        CASE WHEN e.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(e)) END AS enterprise
    FROM compliance_violations v
    LEFT JOIN licenses l ON l.id = v.license_id
    LEFT JOIN enterprises e ON e.id = v.enterprise_id
"#;

const FILTER_VIOLATION: &str = r#"
    WHERE ($1::TEXT IS NULL OR v.violation_type ILIKE $1 ESCAPE '\'
           OR v.description ILIKE $1 ESCAPE '\'
           OR EXISTS (SELECT 1 FROM enterprises fe
                      WHERE fe.id = v.enterprise_id AND fe.name ILIKE $1 ESCAPE '\'))
      AND ($2::TEXT IS NULL OR v.status = $2)
      AND ($3::TEXT IS NULL OR v.severity = $3)
"#;

/// PostgreSQL implementation of ViolationRepository
pub struct PgViolationRepository {
    pool: PgPool,
}

impl PgViolationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: Uuid) -> AppResult<ComplianceViolation> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Violation {}", id)))
    }
}

#[async_trait]
impl Repository<ComplianceViolation, Uuid> for PgViolationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ComplianceViolation>> {
        debug!("Finding violation by id: {}", id);

        let row = sqlx::query_as::<_, ViolationRow>(&format!(
            "{} WHERE v.id = $1",
            SELECT_VIOLATION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding violation {}: {}", id, e);
            AppError::Database(format!("Failed to find violation: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<ComplianceViolation>> {
        let (items, _) = self
            .list_filtered(&ViolationFilter::default(), limit, offset)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM compliance_violations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting violations: {}", e);
                AppError::Database(format!("Failed to count violations: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &ComplianceViolation) -> AppResult<ComplianceViolation> {
        debug!("Recording violation: {}", entity.violation_type);

        sqlx::query(
            r#"
            INSERT INTO compliance_violations (
                id, detection_date, license_id, enterprise_id,
                violation_type, description, severity, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entity.id)
        .bind(entity.detection_date)
        .bind(entity.license_id)
        .bind(entity.enterprise_id)
        .bind(&entity.violation_type)
        .bind(&entity.description)
        .bind(entity.severity.as_str())
        .bind(entity.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating violation: {}", e);
            AppError::Database(format!("Failed to create violation: {}", e))
        })?;

        self.fetch_one_by_id(entity.id).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &ComplianceViolation) -> AppResult<ComplianceViolation> {
        debug!("Updating violation: {}", entity.id);

        let result = sqlx::query(
            r#"
            UPDATE compliance_violations
            SET detection_date = $2,
                license_id = $3,
                enterprise_id = $4,
                violation_type = $5,
                description = $6,
                severity = $7,
                status = $8
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(entity.detection_date)
        .bind(entity.license_id)
        .bind(entity.enterprise_id)
        .bind(&entity.violation_type)
        .bind(&entity.description)
        .bind(entity.severity.as_str())
        .bind(entity.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating violation {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update violation: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Violation {}", entity.id)));
        }

        self.fetch_one_by_id(entity.id).await
    }
}

#[async_trait]
impl ViolationRepository for PgViolationRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &ViolationFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<ComplianceViolation>, i64)> {
        debug!(
            "Listing violations with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        let pattern = search_pattern(filter.search.as_deref());
        let status = filter.status.map(|s| s.as_str());
        let severity = filter.severity.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM compliance_violations v {}",
            FILTER_VIOLATION
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(severity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting violations: {}", e);
            AppError::Database(format!("Failed to count violations: {}", e))
        })?;

        let rows = sqlx::query_as::<_, ViolationRow>(&format!(
            "{} {} ORDER BY v.detection_date DESC LIMIT $4 OFFSET $5",
            SELECT_VIOLATION, FILTER_VIOLATION
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(severity)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing violations: {}", e);
            AppError::Database(format!("Failed to fetch violations: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, statuses: &[ViolationStatus]) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM compliance_violations WHERE status = ANY($1)",
        )
        .bind(status_strings(statuses))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting violations by status: {}", e);
            AppError::Database(format!("Failed to count violations: {}", e))
        })?;

        Ok(count)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ViolationRow {
    id: Uuid,
    detection_date: Option<NaiveDate>,
    license_id: Option<Uuid>,
    enterprise_id: Option<Uuid>,
    violation_type: Option<String>,
    description: Option<String>,
    severity: Option<String>,
    status: Option<String>,
    license: Option<Json<License>>,
    enterprise: Option<Json<Enterprise>>,
}

impl From<ViolationRow> for ComplianceViolation {
    fn from(row: ViolationRow) -> Self {
        Self {
            id: row.id,
            detection_date: row.detection_date.unwrap_or_default(),
            license_id: row.license_id,
            license: row.license.map(|j| j.0),
            enterprise_id: row.enterprise_id,
            enterprise: row.enterprise.map(|j| j.0),
            violation_type: row.violation_type.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            severity: row
                .severity
                .as_deref()
                .map(ViolationSeverity::from_db)
                .unwrap_or_default(),
            status: row
                .status
                .as_deref()
                .map(ViolationStatus::from_db)
                .unwrap_or_default(),
        }
    }
}
