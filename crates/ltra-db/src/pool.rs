//! PostgreSQL connection pool management

use ltra_core::config::DatabaseConfig;
use ltra_core::{AppError, AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Default idle timeout in seconds
const DEFAULT_IDLE_TIMEOUT: u64 = 600;

/// Create a PostgreSQL connection pool from the database configuration
///
/// # Example
///
/// ```no_run
/// use ltra_core::config::DatabaseConfig;
/// use ltra_db::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: Some("postgresql://localhost/ltra".to_string()),
///         ..Default::default()
///     };
///     let pool = create_pool(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let database_url = config
        .url
        .as_deref()
        .ok_or_else(|| AppError::Config("database.url is not set".to_string()))?;

    info!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT)))
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(|e| {
            warn!("Failed to create database pool: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    info!(
        "Database pool created successfully with {} max connections",
        config.max_connections
    );

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!("Database connection verified");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_config_error() {
        let config = DatabaseConfig::default();
        let result = create_pool(&config).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_pool() {
        let config = DatabaseConfig {
            url: Some(
                std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/ltra".to_string()),
            ),
            ..Default::default()
        };
        assert!(create_pool(&config).await.is_ok());
    }
}
