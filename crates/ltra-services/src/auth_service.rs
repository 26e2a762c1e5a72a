//! Sign-in and password changes

use crate::audit::{actions, AuditService};
use ltra_auth::{JwtService, PasswordService};
use ltra_core::{
    models::{AppRole, User},
    traits::AccessRepository,
    AppError, AppResult,
};
use ltra_db::Store;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Token and profile returned by a successful sign-in
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_in: i64,
    pub role: Option<AppRole>,
    pub user: User,
}

pub struct AuthService {
    access: Arc<dyn AccessRepository>,
    jwt: Arc<JwtService>,
    passwords: PasswordService,
    audit: AuditService,
}

impl AuthService {
    pub fn new(store: &Store, jwt: Arc<JwtService>, audit: AuditService) -> Self {
        Self {
            access: store.access.clone(),
            jwt,
            passwords: PasswordService::new(),
            audit,
        }
    }

    /// Check e-mail and password and sign a token
    ///
    /// Unknown e-mail and wrong password both report `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let Some(user) = self.access.find_user_by_email(email.trim()).await? else {
            warn!("Sign-in with unknown e-mail");
            return Err(AppError::InvalidCredentials);
        };

        if !user.is_active() {
            warn!(user = %user.email, "Sign-in by inactive user");
            return Err(AppError::UserInactive(user.email));
        }

        if !self.password_matches(&user, password)? {
            warn!(user = %user.email, "Sign-in with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let role = user.effective_role();
        let token = self.jwt.create_token_for_user(user.id, &user.email, role)?;
        info!(user = %user.email, role = ?role, "User signed in");

        Ok(LoginResult {
            token,
            expires_in: self.jwt.expiration_secs(),
            role,
            user,
        })
    }

    /// Profile of the signed-in user, with roles
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Uuid) -> AppResult<User> {
        self.access
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let mut user = self.me(user_id).await?;

        if !self.password_matches(&user, current)? {
            warn!(user = %user.email, "Password change with wrong current password");
            return Err(AppError::InvalidCredentials);
        }
        self.passwords.check_new_password(new_password)?;

        user.password_hash = self.passwords.hash_password(new_password)?;
        self.access.update_user(&user).await?;
        info!(user = %user.email, "Password changed");

        self.audit
            .record(
                actions::CHANGE_PASSWORD,
                &user.email,
                "users",
                &user_id.to_string(),
                "Changed own password".to_string(),
            )
            .await;
        Ok(())
    }

    fn password_matches(&self, user: &User, password: &str) -> AppResult<bool> {
        if user.password_hash.is_empty() {
            return Ok(false);
        }
        self.passwords.verify_password(password, &user.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_db::{memory::seed::ids, MemoryStore};

    const PASSWORD: &str = "demo-password";

    fn service() -> AuthService {
        let memory = MemoryStore::seeded();
        let hash = PasswordService::new().hash_password(PASSWORD).unwrap();
        memory.set_missing_password_hashes(&hash);

        let store = Store::memory(Arc::new(memory));
        AuthService::new(
            &store,
            Arc::new(JwtService::new("test-secret-with-enough-length", 3600)),
            AuditService::new(store.system_logs.clone()),
        )
    }

    #[tokio::test]
    async fn test_login_issues_token_with_highest_role() {
        let auth = service();
        let result = auth.login("Admin@ltra.gov.la", PASSWORD).await.unwrap();

        assert_eq!(result.role, Some(AppRole::Admin));
        assert_eq!(result.expires_in, 3600);

        let claims = auth.jwt.validate_token(&result.token).unwrap();
        assert_eq!(claims.sub, "admin@ltra.gov.la");
        assert_eq!(claims.uid, ids::user(1));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let err = service()
            .login("admin@ltra.gov.la", "not-the-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_rejected() {
        let err = service()
            .login("nobody@ltra.gov.la", PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_login() {
        let err = service()
            .login("staff2@ltra.gov.la", PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserInactive(_)));
    }

    #[tokio::test]
    async fn test_change_password() {
        let auth = service();
        auth.change_password(ids::user(4), PASSWORD, "new-password-2025")
            .await
            .unwrap();

        assert!(auth.login("staff1@ltra.gov.la", PASSWORD).await.is_err());
        assert!(auth
            .login("staff1@ltra.gov.la", "new-password-2025")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let err = service()
            .change_password(ids::user(4), "wrong-current", "new-password-2025")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
