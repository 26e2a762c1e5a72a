//! Subscriber repository implementation
//!
//! Search only runs for input that already passed [`SearchQuery::parse`],
//! so the pattern is escaped and bounded before it reaches SQL.

use ltra_core::{
    models::{ActivationStatus, Enterprise, NumberRange, Status, Subscriber, SubscriberType},
    search::SearchQuery,
    traits::SubscriberRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SELECT_SUBSCRIBER: &str = r#"
    SELECT
        s.id, s.msisdn, s.serial_number, s.telco_id, s.range_id,
        s.sub_type, s.activation_status, s.activation_date, s.expiry_date,
        s.status, s.last_sync_at,
        CASE WHEN e.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(e)) END AS telco,
        CASE WHEN r.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(r)) END AS "range"
    FROM subscribers s
    LEFT JOIN enterprises e ON e.id = s.telco_id
    LEFT JOIN number_ranges r ON r.id = s.range_id
"#;

/// PostgreSQL implementation of SubscriberRepository
pub struct PgSubscriberRepository {
    pool: PgPool,
}

impl PgSubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRepository for PgSubscriberRepository {
    #[instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Subscriber>, i64)> {
        debug!("Listing subscribers limit={} offset={}", limit, offset);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting subscribers: {}", e);
                AppError::Database(format!("Failed to count subscribers: {}", e))
            })?;

        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            "{} ORDER BY s.msisdn LIMIT $1 OFFSET $2",
            SELECT_SUBSCRIBER
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscribers: {}", e);
            AppError::Database(format!("Failed to fetch subscribers: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &SearchQuery, limit: i64) -> AppResult<Vec<Subscriber>> {
        debug!("Searching subscribers for '{}'", query.term());

        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            r#"{}
            WHERE s.msisdn ILIKE $1 ESCAPE '\' OR s.serial_number ILIKE $1 ESCAPE '\'
            ORDER BY s.msisdn
            LIMIT $2
            "#,
            SELECT_SUBSCRIBER
        ))
        .bind(query.pattern())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error searching subscribers: {}", e);
            AppError::Database(format!("Failed to search subscribers: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    msisdn: String,
    serial_number: Option<String>,
    telco_id: Option<Uuid>,
    range_id: Option<Uuid>,
    sub_type: Option<String>,
    activation_status: Option<String>,
    activation_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    status: Option<String>,
    last_sync_at: Option<DateTime<Utc>>,
    telco: Option<Json<Enterprise>>,
    range: Option<Json<NumberRange>>,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: row.id,
            msisdn: row.msisdn,
            serial_number: row.serial_number.unwrap_or_default(),
            telco_id: row.telco_id,
            telco: row.telco.map(|j| j.0),
            range_id: row.range_id,
            range: row.range.map(|j| j.0),
            sub_type: row
                .sub_type
                .as_deref()
                .map(SubscriberType::from_db)
                .unwrap_or_default(),
            activation_status: row
                .activation_status
                .as_deref()
                .map(ActivationStatus::from_db)
                .unwrap_or_default(),
            activation_date: row.activation_date,
            expiry_date: row.expiry_date,
            status: row.status.as_deref().map(Status::from_db).unwrap_or_default(),
            last_sync_at: row.last_sync_at,
        }
    }
}
