//! Redis caching layer for the LTRA console
//!
//! [`RedisCache`] implements the `CacheService` trait from ltra-core over a
//! multiplexed Redis connection. [`QueryCache`] sits on top of it and gives
//! services read-through caching of list queries with invalidation after
//! mutations. Caching is optional: without a Redis URL every query goes
//! straight to storage.
//!
//! # Example
//!
//! ```no_run
//! use ltra_cache::RedisCache;
//! use ltra_core::traits::CacheService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = RedisCache::new("redis://127.0.0.1:6379").await?;
//!
//!     cache.set("dashboard:stats", &vec![4, 5, 2, 1], 30).await?;
//!     let value: Option<Vec<i64>> = cache.get("dashboard:stats").await?;
//!     assert_eq!(value, Some(vec![4, 5, 2, 1]));
//!
//!     Ok(())
//! }
//! ```

pub mod keys;
mod query;

pub use query::QueryCache;

use async_trait::async_trait;
use ltra_core::error::AppError;
use ltra_core::traits::CacheService;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Redis cache implementation over a ConnectionManager
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis
    ///
    /// # Errors
    ///
    /// Returns `AppError::CacheConnection` if the URL is invalid or the
    /// server cannot be reached
    pub async fn new(url: &str) -> Result<Self, AppError> {
        debug!("Connecting to Redis at {}", url);

        let client = Client::open(url).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            AppError::CacheConnection(format!("Invalid Redis URL: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to establish Redis connection: {}", e);
            AppError::CacheConnection(format!("Connection failed: {}", e))
        })?;

        debug!("Redis connection established successfully");
        Ok(Self { manager })
    }

    /// Ping the Redis server to check connectivity
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Redis ping failed: {}", e);
                AppError::Cache(format!("Ping failed: {}", e))
            })?;
        Ok(())
    }

    /// Delete every key matching a glob pattern, returning how many went
    ///
    /// Walks the keyspace with SCAN so large databases are not blocked.
    pub async fn delete_pattern(&self, pattern: &str) -> Result<usize, AppError> {
        debug!("DEL pattern {}", pattern);
        let mut conn = self.manager.clone();
        let mut cursor: u64 = 0;
        let mut matched: Vec<String> = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_redis_error)?;
            matched.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        if matched.is_empty() {
            return Ok(0);
        }

        let deleted: usize = conn.del(&matched).await.map_err(Self::map_redis_error)?;
        Ok(deleted)
    }

    /// Flush all keys from the current database
    #[cfg(test)]
    pub async fn flush_db(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Failed to flush database: {}", e);
                AppError::Cache(format!("Flush failed: {}", e))
            })?;
        Ok(())
    }

    /// Convert RedisError to AppError
    fn map_redis_error(err: RedisError) -> AppError {
        match err.kind() {
            redis::ErrorKind::IoError => {
                error!("Redis I/O error: {}", err);
                AppError::CacheConnection(format!("I/O error: {}", err))
            }
            redis::ErrorKind::TypeError => {
                warn!("Redis type error: {}", err);
                AppError::Cache(format!("Type mismatch: {}", err))
            }
            _ => {
                error!("Redis error: {}", err);
                AppError::Cache(err.to_string())
            }
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    /// Get a value and deserialize it from JSON
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        debug!("GET {}", key);
        let mut conn = self.manager.clone();

        let result: Option<String> = conn.get(key).await.map_err(Self::map_redis_error)?;

        match result {
            Some(json) => {
                let value = serde_json::from_str::<T>(&json).map_err(|e| {
                    error!("Failed to deserialize value for key {}: {}", key, e);
                    AppError::Serialization(format!("Deserialization failed: {}", e))
                })?;
                debug!("Cache HIT: {}", key);
                Ok(Some(value))
            }
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    /// Store a value as JSON with a TTL
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> Result<(), AppError> {
        debug!("SET {} (TTL: {}s)", key, ttl_secs);
        let mut conn = self.manager.clone();

        let json = serde_json::to_string(value).map_err(|e| {
            error!("Failed to serialize value for key {}: {}", key, e);
            AppError::Serialization(format!("Serialization failed: {}", e))
        })?;

        let _: () = conn
            .set_ex(key, json, ttl_secs)
            .await
            .map_err(Self::map_redis_error)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        debug!("DEL {}", key);
        let mut conn = self.manager.clone();

        let deleted: i32 = conn.del(key).await.map_err(Self::map_redis_error)?;

        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        debug!("EXISTS {}", key);
        let mut conn = self.manager.clone();

        let exists: bool = conn.exists(key).await.map_err(Self::map_redis_error)?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_core::models::DashboardStats;

    async fn setup_cache() -> RedisCache {
        let cache = RedisCache::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");
        cache.flush_db().await.expect("Failed to flush DB");
        cache
    }

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let result = RedisCache::new("not-a-redis-url").await;
        assert!(matches!(result, Err(AppError::CacheConnection(_))));
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_ping() {
        let cache = setup_cache().await;
        assert!(cache.ping().await.is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_set_and_get() {
        let cache = setup_cache().await;

        let stats = DashboardStats {
            total_active_licenses: 4,
            total_number_ranges: 5,
            pending_applications: 2,
            new_violations: 1,
        };

        cache.set(keys::DASHBOARD_STATS, &stats, 60).await.unwrap();

        let result: Option<DashboardStats> = cache.get(keys::DASHBOARD_STATS).await.unwrap();
        assert_eq!(result, Some(stats));
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_delete() {
        let cache = setup_cache().await;

        cache.set("licenses:list", &vec![1, 2, 3], 60).await.unwrap();
        assert!(cache.exists("licenses:list").await.unwrap());

        assert!(cache.delete("licenses:list").await.unwrap());
        assert!(!cache.exists("licenses:list").await.unwrap());
        assert!(!cache.delete("licenses:list").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_delete_pattern() {
        let cache = setup_cache().await;

        cache.set("applications:list", &1, 60).await.unwrap();
        cache.set("applications:list:page=2", &2, 60).await.unwrap();
        cache.set("licenses:list", &3, 60).await.unwrap();

        let deleted = cache.delete_pattern("applications:*").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(cache.exists("licenses:list").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_ttl_on_set() {
        let cache = setup_cache().await;

        cache.set("dashboard:stats", &1, 1).await.unwrap();
        assert!(cache.exists("dashboard:stats").await.unwrap());

        tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;

        let result: Option<i32> = cache.get("dashboard:stats").await.unwrap();
        assert_eq!(result, None);
    }
}
