//! LTRA Console Database Layer
//!
//! Storage backends for the console:
//!
//! - PostgreSQL repositories built on sqlx
//! - An in-memory store seeded with the demo dataset, implementing the
//!   same repository traits
//! - [`Store`], the bundle of trait objects services and handlers use

pub mod memory;
pub mod pool;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use repositories::*;
pub use store::Store;

pub use ltra_core::{AppError, AppResult};
pub use sqlx::PgPool;
