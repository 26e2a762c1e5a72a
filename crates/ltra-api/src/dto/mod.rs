//! Data Transfer Objects (DTOs) for API requests and responses

pub mod admin;
pub mod application;
pub mod auth;
pub mod common;
pub mod registry;
pub mod resources;

pub use admin::*;
pub use application::*;
pub use auth::*;
pub use common::*;
pub use registry::*;
pub use resources::*;
