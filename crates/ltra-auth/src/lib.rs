//! Authentication and authorization for the LTRA console
//!
//! - JWT token creation and validation
//! - Argon2 password hashing and verification
//! - Request extractors enforcing the console role hierarchy
//!
//! # Examples
//!
//! ```
//! use ltra_auth::{JwtService, PasswordService};
//! use ltra_core::models::AppRole;
//! use uuid::Uuid;
//!
//! let passwords = PasswordService::new();
//! let hash = passwords.hash_password("secure_password")?;
//! assert!(passwords.verify_password("secure_password", &hash)?);
//!
//! let jwt = JwtService::new("your-secret-key", 3600);
//! let token = jwt.create_token_for_user(Uuid::new_v4(), "staff1@ltra.gov.la", Some(AppRole::Staff))?;
//! assert_eq!(jwt.validate_token(&token)?.role, Some(AppRole::Staff));
//! # Ok::<(), ltra_core::error::AppError>(())
//! ```
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use ltra_auth::middleware::{AdminUser, StaffUser};
//!
//! async fn list_licenses(user: StaffUser) -> HttpResponse {
//!     HttpResponse::Ok().json(serde_json::json!({ "email": user.email }))
//! }
//!
//! async fn manage_roles(_admin: AdminUser) -> HttpResponse {
//!     HttpResponse::Ok().finish()
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser, ReviewerUser, StaffUser, TOKEN_COOKIE};
pub use password::PasswordService;
