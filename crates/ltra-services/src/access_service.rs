//! Roles, permissions, users and role assignment

use crate::audit::{actions, AuditService};
use crate::constants::ROLE_ALREADY_ASSIGNED;
use chrono::Utc;
use ltra_auth::PasswordService;
use ltra_core::{
    models::{
        PermissionAction, PermissionScope, Resource, Role, RolePermission, Status, User, UserRole,
    },
    traits::AccessRepository,
    AppError, AppResult,
};
use ltra_db::Store;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Input for creating a console user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub status: Option<Status>,
}

/// Editable user fields; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub status: Option<Status>,
    pub password: Option<String>,
}

pub struct AccessService {
    access: Arc<dyn AccessRepository>,
    passwords: PasswordService,
    audit: AuditService,
}

impl AccessService {
    pub fn new(store: &Store, audit: AuditService) -> Self {
        Self {
            access: store.access.clone(),
            passwords: PasswordService::new(),
            audit,
        }
    }

    // ==================== Roles and permissions ====================

    pub async fn roles(&self) -> AppResult<Vec<Role>> {
        self.access.list_roles().await
    }

    pub async fn resources(&self) -> AppResult<Vec<Resource>> {
        self.access.list_resources().await
    }

    /// Permissions of one role, or of every role
    pub async fn permissions(&self, role_id: Option<Uuid>) -> AppResult<Vec<RolePermission>> {
        self.access.list_permissions(role_id).await
    }

    #[instrument(skip(self))]
    pub async fn grant_permission(
        &self,
        role_id: Uuid,
        resource: &str,
        action: PermissionAction,
        scope: PermissionScope,
        actor: &str,
    ) -> AppResult<RolePermission> {
        let role = self.find_role(role_id).await?;

        let resources = self.access.list_resources().await?;
        if !resources.iter().any(|r| r.code == resource) {
            return Err(AppError::Validation(format!("Unknown resource {}", resource)));
        }

        let permission = RolePermission {
            id: Uuid::new_v4(),
            role_id,
            role: None,
            resource: resource.to_string(),
            action,
            scope,
        };
        let created = self.access.create_permission(&permission).await?;
        info!(role = %role.code, resource, action = %action, "Permission granted");

        self.audit
            .record(
                actions::GRANT_PERMISSION,
                actor,
                "role_permissions",
                &created.id.to_string(),
                format!("Granted {} on {} to {}", action, resource, role.code),
            )
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn revoke_permission(&self, id: Uuid, actor: &str) -> AppResult<()> {
        if !self.access.delete_permission(id).await? {
            return Err(AppError::NotFound(format!("Permission {}", id)));
        }
        info!(id = %id, "Permission revoked");

        self.audit
            .record(
                actions::REVOKE_PERMISSION,
                actor,
                "role_permissions",
                &id.to_string(),
                "Revoked permission".to_string(),
            )
            .await;
        Ok(())
    }

    // ==================== Users ====================

    pub async fn users(&self) -> AppResult<Vec<User>> {
        self.access.list_users().await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.access
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: NewUser, actor: &str) -> AppResult<User> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || input.full_name.trim().is_empty() {
            return Err(AppError::Validation(
                "email and full_name must not be empty".to_string(),
            ));
        }
        self.passwords.check_new_password(&input.password)?;

        let user = User {
            id: Uuid::new_v4(),
            email,
            full_name: input.full_name.trim().to_string(),
            password_hash: self.passwords.hash_password(&input.password)?,
            status: input.status.unwrap_or(Status::Active),
            created_at: Utc::now(),
            roles: None,
        };
        let created = self.access.create_user(&user).await?;
        info!(id = %created.id, "User created");

        self.audit
            .record(
                actions::CREATE_USER,
                actor,
                "users",
                &created.id.to_string(),
                format!("Created user {}", created.email),
            )
            .await;
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: Uuid, update: UserUpdate, actor: &str) -> AppResult<User> {
        let mut user = self.get_user(id).await?;

        if let Some(full_name) = update.full_name {
            if full_name.trim().is_empty() {
                return Err(AppError::Validation("full_name must not be empty".to_string()));
            }
            user.full_name = full_name.trim().to_string();
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        if let Some(password) = update.password {
            self.passwords.check_new_password(&password)?;
            user.password_hash = self.passwords.hash_password(&password)?;
        }

        let updated = self.access.update_user(&user).await?;
        info!(id = %id, status = %updated.status, "User updated");

        self.audit
            .record(
                actions::UPDATE_USER,
                actor,
                "users",
                &id.to_string(),
                format!("Updated user {}", updated.email),
            )
            .await;
        Ok(updated)
    }

    // ==================== Role assignment ====================

    pub async fn user_roles(&self) -> AppResult<Vec<UserRole>> {
        self.access.list_user_roles().await
    }

    /// Give `user_id` the role `role_id`
    ///
    /// Fails with `Conflict` when the user already holds the role.
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid, actor: &str) -> AppResult<UserRole> {
        let user = self.get_user(user_id).await?;
        let role = self.find_role(role_id).await?;

        if self.access.find_user_role(user_id, role_id).await?.is_some() {
            warn!(user = %user.email, role = %role.code, "Role already assigned");
            return Err(AppError::Conflict(ROLE_ALREADY_ASSIGNED.to_string()));
        }

        let link = UserRole {
            id: Uuid::new_v4(),
            user_id,
            role_id,
            user: None,
            role: None,
            created_at: Utc::now(),
        };
        let created = self
            .access
            .create_user_role(&link)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent assignment of the same role
                AppError::AlreadyExists(_) => {
                    warn!(user = %user.email, role = %role.code, "Role assigned concurrently");
                    AppError::Conflict(ROLE_ALREADY_ASSIGNED.to_string())
                }
                other => other,
            })?;
        info!(user = %user.email, role = %role.code, "Role assigned");

        self.audit
            .record(
                actions::ASSIGN_ROLE,
                actor,
                "user_roles",
                &created.id.to_string(),
                format!("Assigned {} to {}", role.code, user.email),
            )
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn remove_role(&self, user_id: Uuid, role_id: Uuid, actor: &str) -> AppResult<()> {
        if !self.access.delete_user_role(user_id, role_id).await? {
            return Err(AppError::NotFound(format!(
                "Role {} of user {}",
                role_id, user_id
            )));
        }
        info!(user = %user_id, role = %role_id, "Role removed");

        self.audit
            .record(
                actions::REMOVE_ROLE,
                actor,
                "user_roles",
                &user_id.to_string(),
                format!("Removed role {}", role_id),
            )
            .await;
        Ok(())
    }

    async fn find_role(&self, id: Uuid) -> AppResult<Role> {
        self.access
            .find_role(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_core::models::AppRole;
    use ltra_db::memory::seed::ids;

    fn service(store: &Store) -> AccessService {
        AccessService::new(store, AuditService::new(store.system_logs.clone()))
    }

    #[tokio::test]
    async fn test_duplicate_assignment_conflicts() {
        let store = Store::seeded();
        let err = service(&store)
            .assign_role(ids::user(1), ids::role(1), "admin@ltra.gov.la")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Người dùng đã có vai trò này");
    }

    /// Access repository whose link lookup never sees existing links
    struct StaleLookup(Arc<dyn AccessRepository>);

    #[async_trait::async_trait]
    impl AccessRepository for StaleLookup {
        async fn list_roles(&self) -> AppResult<Vec<Role>> {
            self.0.list_roles().await
        }
        async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
            self.0.find_role(id).await
        }
        async fn list_resources(&self) -> AppResult<Vec<Resource>> {
            self.0.list_resources().await
        }
        async fn list_permissions(&self, role_id: Option<Uuid>) -> AppResult<Vec<RolePermission>> {
            self.0.list_permissions(role_id).await
        }
        async fn create_permission(&self, permission: &RolePermission) -> AppResult<RolePermission> {
            self.0.create_permission(permission).await
        }
        async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
            self.0.delete_permission(id).await
        }
        async fn list_users(&self) -> AppResult<Vec<User>> {
            self.0.list_users().await
        }
        async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
            self.0.find_user(id).await
        }
        async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
            self.0.find_user_by_email(email).await
        }
        async fn create_user(&self, user: &User) -> AppResult<User> {
            self.0.create_user(user).await
        }
        async fn update_user(&self, user: &User) -> AppResult<User> {
            self.0.update_user(user).await
        }
        async fn list_user_roles(&self) -> AppResult<Vec<UserRole>> {
            self.0.list_user_roles().await
        }
        async fn find_user_role(&self, _user_id: Uuid, _role_id: Uuid) -> AppResult<Option<UserRole>> {
            Ok(None)
        }
        async fn create_user_role(&self, link: &UserRole) -> AppResult<UserRole> {
            self.0.create_user_role(link).await
        }
        async fn delete_user_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
            self.0.delete_user_role(user_id, role_id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_assignment_conflicts() {
        let mut store = Store::seeded();
        store.access = Arc::new(StaleLookup(store.access.clone()));

        let err = service(&store)
            .assign_role(ids::user(1), ids::role(1), "admin@ltra.gov.la")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), ROLE_ALREADY_ASSIGNED);
    }

    #[tokio::test]
    async fn test_assign_raises_effective_role() {
        let store = Store::seeded();
        let service = service(&store);

        let link = service
            .assign_role(ids::user(4), ids::role(3), "admin@ltra.gov.la")
            .await
            .unwrap();
        assert_eq!(link.role.unwrap().code, "reviewer");

        let user = service.get_user(ids::user(4)).await.unwrap();
        assert_eq!(user.effective_role(), Some(AppRole::Reviewer));
    }

    #[tokio::test]
    async fn test_assign_unknown_role_is_not_found() {
        let store = Store::seeded();
        let err = service(&store)
            .assign_role(ids::user(4), Uuid::new_v4(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_role_twice() {
        let store = Store::seeded();
        let service = service(&store);

        service
            .remove_role(ids::user(1), ids::role(2), "admin@ltra.gov.la")
            .await
            .unwrap();
        let err = service
            .remove_role(ids::user(1), ids::role(2), "admin@ltra.gov.la")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_grant_and_revoke_permission() {
        let store = Store::seeded();
        let service = service(&store);

        let granted = service
            .grant_permission(
                ids::role(4),
                "license",
                PermissionAction::Read,
                PermissionScope::Any,
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();
        assert_eq!(granted.role.unwrap().code, "staff");
        assert_eq!(service.permissions(Some(ids::role(4))).await.unwrap().len(), 6);

        service
            .revoke_permission(granted.id, "admin@ltra.gov.la")
            .await
            .unwrap();
        let err = service
            .revoke_permission(granted.id, "admin@ltra.gov.la")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_resource_rejected() {
        let store = Store::seeded();
        let err = service(&store)
            .grant_permission(
                ids::role(4),
                "spaceship",
                PermissionAction::Read,
                PermissionScope::Any,
                "x",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let store = Store::seeded();
        let created = service(&store)
            .create_user(
                NewUser {
                    email: " New.Staff@LTRA.gov.la ".to_string(),
                    full_name: "Vũ Thị Mới".to_string(),
                    password: "mat-khau-moi".to_string(),
                    status: None,
                },
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();

        assert_eq!(created.email, "new.staff@ltra.gov.la");
        assert!(created.password_hash.starts_with("$argon2"));
        assert_eq!(created.status, Status::Active);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let store = Store::seeded();
        let err = service(&store)
            .create_user(
                NewUser {
                    email: "a@ltra.gov.la".to_string(),
                    full_name: "A".to_string(),
                    password: "short".to_string(),
                    status: None,
                },
                "x",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_deactivate_user() {
        let store = Store::seeded();
        let updated = service(&store)
            .update_user(
                ids::user(4),
                UserUpdate {
                    status: Some(Status::Inactive),
                    ..Default::default()
                },
                "admin@ltra.gov.la",
            )
            .await
            .unwrap();
        assert!(!updated.is_active());
    }
}
