//! Application configuration
//!
//! Configuration is layered with the `config` crate: built-in defaults,
//! then `config/default.toml`, then `config/{RUN_MODE}.toml`, then
//! `LTRA__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::fmt;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Only required for the postgres backend.
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

/// Which data backend serves the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => write!(f, "postgres"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Password given to demo accounts of the memory backend
    pub seed_password: Option<String>,
}

/// Query cache configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Redis connection URL; caching is disabled when absent
    pub redis_url: Option<String>,

    /// Seconds a cached list stays fresh
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,
}

fn default_stale_time() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            stale_time_secs: default_stale_time(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: i64,
}

fn default_jwt_expiration() -> i64 {
    86400 // 24 hours
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .finish()
    }
}

/// CORS configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Comma separated list of allowed origins
    #[serde(default = "default_origins")]
    pub origins: String,
}

fn default_origins() -> String {
    "http://localhost:5173,http://localhost:3000".to_string()
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_origins(),
        }
    }
}

impl CorsConfig {
    /// Allowed origins, trimmed, empty entries dropped
    pub fn origin_list(&self) -> Vec<String> {
        self.origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl AppConfig {
    /// Load configuration from defaults, config files and environment
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("storage.backend", "postgres")?
            .set_default("cache.stale_time_secs", 30)?
            .set_default("auth.jwt_expiration_secs", 86400)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("LTRA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("LTRA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-section checks that serde defaults cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Message(
                "database.url is required when storage.backend = postgres".to_string(),
            ));
        }
        if self.auth.jwt_secret.len() < 16 {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be at least 16 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
