//! System log repository implementation

use ltra_core::{
    models::{NewSystemLog, SystemLog},
    traits::SystemLogRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of SystemLogRepository
pub struct PgSystemLogRepository {
    pool: PgPool,
}

impl PgSystemLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> SystemLog {
        SystemLog {
            id: row.get("id"),
            action: row.get("action"),
            actor: row.get::<Option<String>, _>("actor").unwrap_or_default(),
            target_entity: row
                .get::<Option<String>, _>("target_entity")
                .unwrap_or_default(),
            target_id: row.get::<Option<String>, _>("target_id").unwrap_or_default(),
            details: row.get::<Option<String>, _>("details").unwrap_or_default(),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl SystemLogRepository for PgSystemLogRepository {
    #[instrument(skip(self))]
    async fn recent(&self, limit: i64) -> AppResult<Vec<SystemLog>> {
        debug!("Fetching {} most recent system logs", limit);

        let rows = sqlx::query(
            r#"
            SELECT id, action, actor, target_entity, target_id, details, created_at
            FROM system_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .map(Self::map_row)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching system logs: {}", e);
            AppError::Database(format!("Failed to fetch system logs: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self, entry))]
    async fn create(&self, entry: &NewSystemLog) -> AppResult<SystemLog> {
        debug!("Recording {} on {}", entry.action, entry.target_entity);

        let row = sqlx::query(
            r#"
            INSERT INTO system_logs (id, action, actor, target_entity, target_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, action, actor, target_entity, target_id, details, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.action)
        .bind(&entry.actor)
        .bind(&entry.target_entity)
        .bind(&entry.target_id)
        .bind(&entry.details)
        .map(Self::map_row)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating system log: {}", e);
            AppError::Database(format!("Failed to create system log: {}", e))
        })?;

        Ok(row)
    }
}
