//! Read-through query cache with invalidation after mutations

use crate::{keys, RedisCache};
use ltra_core::config::CacheConfig;
use ltra_core::traits::CacheService;
use ltra_core::AppResult;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tracing::{debug, info, warn};

/// Optional Redis-backed cache for list queries
///
/// Cache failures never fail the caller: reads fall through to the fetch
/// closure and write or delete errors are logged at `warn`.
#[derive(Clone)]
pub struct QueryCache {
    redis: Option<RedisCache>,
    ttl_secs: u64,
}

impl QueryCache {
    /// A cache that always fetches
    pub fn disabled() -> Self {
        Self {
            redis: None,
            ttl_secs: 0,
        }
    }

    pub fn new(redis: RedisCache, ttl_secs: u64) -> Self {
        Self {
            redis: Some(redis),
            ttl_secs,
        }
    }

    /// Connect when a Redis URL is configured; otherwise, or when the
    /// connection fails, caching is disabled
    pub async fn from_config(config: &CacheConfig) -> Self {
        let Some(url) = config.redis_url.as_deref() else {
            info!("No Redis URL configured, query cache disabled");
            return Self::disabled();
        };

        match RedisCache::new(url).await {
            Ok(redis) => {
                info!(ttl_secs = config.stale_time_secs, "Query cache enabled");
                Self::new(redis, config.stale_time_secs)
            }
            Err(e) => {
                warn!("Query cache disabled, Redis unavailable: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let Some(redis) = &self.redis else {
            return fetch().await;
        };

        match redis.get::<T>(key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => warn!(key, "Cache read failed, querying storage: {}", e),
        }

        let value = fetch().await?;
        if let Err(e) = redis.set(key, &value, self.ttl_secs).await {
            warn!(key, "Cache write failed: {}", e);
        }
        Ok(value)
    }

    /// Drop every cached query of `entity` and the dashboard counters
    pub async fn invalidate(&self, entity: &str) {
        let Some(redis) = &self.redis else {
            return;
        };

        for pattern in keys::invalidation_patterns(entity) {
            match redis.delete_pattern(&pattern).await {
                Ok(n) => debug!(pattern = %pattern, deleted = n, "Invalidated cached queries"),
                Err(e) => warn!(pattern = %pattern, "Cache invalidation failed: {}", e),
            }
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::disabled()
    }
}
