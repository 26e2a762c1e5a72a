//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use ltra_core::error::AppError;
use rand_core::OsRng;
use tracing::{debug, error};

/// Shortest password accepted when a user sets a new one
pub const MIN_PASSWORD_LEN: usize = 8;

/// Password hashing service using Argon2 with default parameters
#[derive(Debug, Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a password into a PHC string
    ///
    /// ```
    /// use ltra_auth::PasswordService;
    ///
    /// let hash = PasswordService::new().hash_password("mật-khẩu-2024")?;
    /// assert!(hash.starts_with("$argon2"));
    /// # Ok::<(), ltra_core::error::AppError>(())
    /// ```
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        debug!("Hashing password");

        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::PasswordHash(format!("Password hashing failed: {}", e))
            })?;

        Ok(password_hash.to_string())
    }

    /// Verify a password against a PHC hash
    ///
    /// Returns `Ok(false)` on a mismatch and an error only when the hash
    /// itself cannot be parsed or checked.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        debug!("Verifying password");

        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "Failed to parse password hash");
            AppError::PasswordHash(format!("Invalid password hash format: {}", e))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Password verification error");
                Err(AppError::PasswordHash(format!(
                    "Password verification failed: {}",
                    e
                )))
            }
        }
    }

    /// Reject new passwords shorter than [`MIN_PASSWORD_LEN`] characters
    pub fn check_new_password(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}
