//! Application repository implementation
//!
//! Applications are listed newest first with their enterprise and
//! license embedded.

use super::{is_unique_violation, search_pattern, status_strings};
use ltra_core::{
    models::{Application, ApplicationStatus, ApplicationType, Enterprise, License},
    traits::{ApplicationFilter, ApplicationRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const SELECT_APPLICATION: &str = r#"
    SELECT
        a.id, a.code, a.enterprise_id, a.license_id, a.type AS application_type,
        a.status, a.workflow_step_id, a.submission_date, a.created_by, a.created_at,
        CASE WHEN e.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(e)) END AS enterprise,
        CASE WHEN l.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(l)) END AS license
    FROM applications a
    LEFT JOIN enterprises e ON e.id = a.enterprise_id
    LEFT JOIN licenses l ON l.id = a.license_id
"#;

const FILTER_APPLICATION: &str = r#"
    WHERE ($1::TEXT IS NULL OR a.code ILIKE $1 ESCAPE '\'
           OR EXISTS (SELECT 1 FROM enterprises fe
                      WHERE fe.id = a.enterprise_id AND fe.name ILIKE $1 ESCAPE '\'))
      AND ($2::TEXT IS NULL OR a.status = $2)
"#;

/// PostgreSQL implementation of ApplicationRepository
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: Uuid) -> AppResult<Application> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {}", id)))
    }
}

#[async_trait]
impl Repository<Application, Uuid> for PgApplicationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        debug!("Finding application by id: {}", id);

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{} WHERE a.id = $1",
            SELECT_APPLICATION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding application {}: {}", id, e);
            AppError::Database(format!("Failed to find application: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Application>> {
        let (items, _) = self
            .list_filtered(&ApplicationFilter::default(), limit, offset)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting applications: {}", e);
                AppError::Database(format!("Failed to count applications: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Application) -> AppResult<Application> {
        debug!("Creating application: {}", entity.code);

        sqlx::query(
            r#"
            INSERT INTO applications (
                id, code, enterprise_id, license_id, type, status,
                workflow_step_id, submission_date, created_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entity.id)
        .bind(&entity.code)
        .bind(entity.enterprise_id)
        .bind(entity.license_id)
        .bind(entity.application_type.as_str())
        .bind(entity.status.as_str())
        .bind(entity.workflow_step_id)
        .bind(entity.submission_date)
        .bind(&entity.created_by)
        .bind(entity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating application: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!("Application {} already exists", entity.code))
            } else {
                AppError::Database(format!("Failed to create application: {}", e))
            }
        })?;

        info!("Application {} created", entity.code);
        self.fetch_one_by_id(entity.id).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Application) -> AppResult<Application> {
        debug!("Updating application: {}", entity.id);

        let result = sqlx::query(
            r#"
            UPDATE applications
            SET code = $2,
                enterprise_id = $3,
                license_id = $4,
                type = $5,
                status = $6,
                workflow_step_id = $7,
                submission_date = $8
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.code)
        .bind(entity.enterprise_id)
        .bind(entity.license_id)
        .bind(entity.application_type.as_str())
        .bind(entity.status.as_str())
        .bind(entity.workflow_step_id)
        .bind(entity.submission_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating application {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update application: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Application {}", entity.id)));
        }

        self.fetch_one_by_id(entity.id).await
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &ApplicationFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Application>, i64)> {
        debug!(
            "Listing applications with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        let pattern = search_pattern(filter.search.as_deref());
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM applications a {}",
            FILTER_APPLICATION
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting applications: {}", e);
            AppError::Database(format!("Failed to count applications: {}", e))
        })?;

        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{} {} ORDER BY a.created_at DESC LIMIT $3 OFFSET $4",
            SELECT_APPLICATION, FILTER_APPLICATION
        ))
        .bind(pattern.as_deref())
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing applications: {}", e);
            AppError::Database(format!("Failed to fetch applications: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, statuses: &[ApplicationStatus]) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE status = ANY($1)")
                .bind(status_strings(statuses))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting applications by status: {}", e);
                    AppError::Database(format!("Failed to count applications: {}", e))
                })?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        submission_date: Option<DateTime<Utc>>,
    ) -> AppResult<Application> {
        debug!("Updating application {} status to {}", id, status);

        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2,
                submission_date = COALESCE($3, submission_date)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(submission_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating application status {}: {}", id, e);
            AppError::Database(format!("Failed to update application status: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Application {}", id)));
        }

        self.fetch_one_by_id(id).await
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    code: String,
    enterprise_id: Option<Uuid>,
    license_id: Option<Uuid>,
    application_type: Option<String>,
    status: Option<String>,
    workflow_step_id: Option<Uuid>,
    submission_date: Option<DateTime<Utc>>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
    enterprise: Option<Json<Enterprise>>,
    license: Option<Json<License>>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            enterprise_id: row.enterprise_id.unwrap_or_default(),
            enterprise: row.enterprise.map(|j| j.0),
            license_id: row.license_id,
            license: row.license.map(|j| j.0),
            application_type: row
                .application_type
                .as_deref()
                .map(ApplicationType::from_db)
                .unwrap_or_default(),
            status: row
                .status
                .as_deref()
                .map(ApplicationStatus::from_db)
                .unwrap_or_default(),
            workflow_step_id: row.workflow_step_id,
            submission_date: row.submission_date,
            created_by: row.created_by.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}
