//! JWT claims carried by console tokens

use chrono::{Duration, Utc};
use ltra_core::models::AppRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience stamped on every console token
pub const AUDIENCE: &str = "ltra-console";

/// JWT Claims
///
/// `role` is the user's effective (highest) role at sign-in. A user without
/// any role still gets a token, but only for the account endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user e-mail)
    pub sub: String,

    /// User id
    pub uid: Uuid,

    /// Audience, always [`AUDIENCE`]
    pub aud: String,

    /// Effective role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AppRole>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims; the expiry is filled in by [`crate::JwtService`]
    ///
    /// ```
    /// use ltra_auth::Claims;
    /// use ltra_core::models::AppRole;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::new(Uuid::nil(), "admin@ltra.gov.la", Some(AppRole::Admin));
    /// assert_eq!(claims.sub, "admin@ltra.gov.la");
    /// assert_eq!(claims.exp, 0);
    /// ```
    pub fn new(user_id: Uuid, email: &str, role: Option<AppRole>) -> Self {
        Self {
            sub: email.to_string(),
            uid: user_id,
            aud: AUDIENCE.to_string(),
            role,
            iat: Utc::now().timestamp(),
            exp: 0,
        }
    }

    /// Create claims expiring `expires_in_secs` from now
    pub fn with_expiration(
        user_id: Uuid,
        email: &str,
        role: Option<AppRole>,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: email.to_string(),
            uid: user_id,
            aud: AUDIENCE.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    pub fn email(&self) -> &str {
        &self.sub
    }

    /// True when the token's role is at least `required`
    pub fn has_role(&self, required: AppRole) -> bool {
        self.role.is_some_and(|r| r.has_role(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_with_expiration() {
        let claims = Claims::with_expiration(Uuid::new_v4(), "a@ltra.gov.la", None, 3600);
        assert!(!claims.is_expired());

        let now = Utc::now().timestamp();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3600);
    }

    #[test]
    fn test_expired_claims() {
        let mut claims = Claims::new(Uuid::new_v4(), "a@ltra.gov.la", None);
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_role_hierarchy() {
        let director = Claims::new(Uuid::new_v4(), "d@ltra.gov.la", Some(AppRole::Director));
        assert!(director.has_role(AppRole::Staff));
        assert!(director.has_role(AppRole::Reviewer));
        assert!(director.has_role(AppRole::Director));
        assert!(!director.has_role(AppRole::Admin));
    }

    #[test]
    fn test_no_role_has_nothing() {
        let claims = Claims::new(Uuid::new_v4(), "x@ltra.gov.la", None);
        assert!(!claims.has_role(AppRole::Staff));
    }

    #[test]
    fn test_role_omitted_from_json_when_absent() {
        let claims = Claims::new(Uuid::nil(), "x@ltra.gov.la", None);
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("role"));

        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, None);
    }
}
