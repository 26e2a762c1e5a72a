//! JWT token creation and validation service

use crate::claims::{Claims, AUDIENCE};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use ltra_core::error::AppError;
use ltra_core::models::AppRole;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// JWT Service for token creation and validation
#[derive(Clone)]
pub struct JwtService {
    /// Default token lifetime in seconds
    expiration_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    ///
    /// ```
    /// use ltra_auth::JwtService;
    ///
    /// let jwt_service = JwtService::new("my-secret-key", 3600);
    /// assert_eq!(jwt_service.expiration_secs(), 3600);
    /// ```
    pub fn new(secret: &str, expiration_secs: i64) -> Self {
        Self {
            expiration_secs,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token; claims without an expiry get the default lifetime
    pub fn create_token(&self, claims: &Claims) -> Result<String, AppError> {
        let mut token_claims = claims.clone();

        if token_claims.exp == 0 {
            let exp = Utc::now() + Duration::seconds(self.expiration_secs);
            token_claims.exp = exp.timestamp();
        }

        debug!(uid = %token_claims.uid, exp = token_claims.exp, "Signing token");

        encode(&Header::default(), &token_claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to sign token");
            AppError::Internal(format!("token signing failed: {}", e))
        })
    }

    /// Sign a token for a user
    pub fn create_token_for_user(
        &self,
        user_id: Uuid,
        email: &str,
        role: Option<AppRole>,
    ) -> Result<String, AppError> {
        self.create_token(&Claims::new(user_id, email, role))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// - `AppError::TokenExpired` if the token has expired
    /// - `AppError::InvalidToken` if the signature or payload is invalid
    ///
    /// ```
    /// use ltra_auth::JwtService;
    /// use ltra_core::models::AppRole;
    /// use uuid::Uuid;
    ///
    /// let jwt_service = JwtService::new("secret", 3600);
    /// let token = jwt_service.create_token_for_user(Uuid::nil(), "a@ltra.gov.la", Some(AppRole::Staff))?;
    /// let decoded = jwt_service.validate_token(&token)?;
    /// assert_eq!(decoded.sub, "a@ltra.gov.la");
    /// # Ok::<(), ltra_core::error::AppError>(())
    /// ```
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.set_audience(&[AUDIENCE]);
        // tokens are rejected the second they expire
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                ErrorKind::InvalidAudience => {
                    warn!("Token issued for another audience");
                    AppError::InvalidToken("token not issued for this console".to_string())
                }
                _ => {
                    warn!(error = %e, "Rejected token");
                    AppError::InvalidToken(e.to_string())
                }
            })?;

        if claims.is_expired() {
            return Err(AppError::TokenExpired);
        }

        debug!(uid = %claims.uid, role = ?claims.role, "Token accepted");
        Ok(claims)
    }

    pub fn expiration_secs(&self) -> i64 {
        self.expiration_secs
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_secs", &self.expiration_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-12345";

    #[test]
    fn test_create_and_validate_token() {
        let jwt_service = JwtService::new(TEST_SECRET, 3600);
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_token_for_user(user_id, "reviewer@ltra.gov.la", Some(AppRole::Reviewer))
            .unwrap();
        assert!(!token.is_empty());

        let decoded = jwt_service.validate_token(&token).unwrap();
        assert_eq!(decoded.sub, "reviewer@ltra.gov.la");
        assert_eq!(decoded.uid, user_id);
        assert_eq!(decoded.role, Some(AppRole::Reviewer));
    }

    #[test]
    fn test_expired_token() {
        let jwt_service = JwtService::new(TEST_SECRET, 1);

        let claims = Claims::with_expiration(Uuid::new_v4(), "a@ltra.gov.la", None, -10);
        let token = jwt_service.create_token(&claims).unwrap();

        let result = jwt_service.validate_token(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_long_expired_token() {
        let jwt_service = JwtService::new(TEST_SECRET, 1);

        let claims = Claims::with_expiration(Uuid::new_v4(), "a@ltra.gov.la", None, -3600);
        let token = jwt_service.create_token(&claims).unwrap();

        let result = jwt_service.validate_token(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let jwt_service = JwtService::new(TEST_SECRET, 3600);

        let result = jwt_service.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let signer = JwtService::new("secret-one-0123456789", 3600);
        let verifier = JwtService::new("secret-two-0123456789", 3600);

        let token = signer
            .create_token_for_user(Uuid::new_v4(), "a@ltra.gov.la", Some(AppRole::Admin))
            .unwrap();

        let result = verifier.validate_token(&token);
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_foreign_audience_rejected() {
        let jwt_service = JwtService::new(TEST_SECRET, 3600);
        let mut claims = Claims::new(Uuid::new_v4(), "a@ltra.gov.la", Some(AppRole::Admin));
        claims.aud = "billing-portal".to_string();
        let token = jwt_service.create_token(&claims).unwrap();

        let result = jwt_service.validate_token(&token);
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_debug_impl_hides_secret() {
        let jwt_service = JwtService::new(TEST_SECRET, 3600);
        let debug_str = format!("{:?}", jwt_service);

        assert!(debug_str.contains("3600"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(TEST_SECRET));
    }
}
