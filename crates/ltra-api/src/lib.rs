//! API layer for the LTRA console
//!
//! HTTP handlers for the licensing, numbering resource, compliance and
//! administration screens, mounted under `/api/v1`.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

pub use handlers::{configure, health};
