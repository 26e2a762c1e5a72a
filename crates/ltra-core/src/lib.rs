//! LTRA Console Core Library
//!
//! Foundational types shared by every crate of the LTRA console backend:
//!
//! - Domain models (Enterprise, License, Application, NumberRange, ...)
//! - Repository traits implemented by the Postgres and in-memory backends
//! - Unified error handling with HTTP response mapping
//! - Search input sanitisation and application workflow rules
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod traits;
pub mod workflow;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
