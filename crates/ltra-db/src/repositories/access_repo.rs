//! Access control repository implementation
//!
//! Roles, resources, role permissions, users and user-role links.

use super::is_unique_violation;
use ltra_core::{
    models::{
        PermissionAction, PermissionScope, Resource, Role, RolePermission, Status, User,
        UserRole,
    },
    traits::AccessRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const SELECT_ROLE: &str = "SELECT id, name, code, description, status, created_at FROM roles";

const SELECT_PERMISSION: &str = r#"
    SELECT p.id, p.role_id, p.resource, p.action, p.scope,
           CASE WHEN r.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(r)) END AS role
    FROM role_permissions p
    LEFT JOIN roles r ON r.id = p.role_id
"#;

const SELECT_USER: &str = r#"
    SELECT u.id, u.email, u.full_name, u.password_hash, u.status, u.created_at,
           COALESCE((
               SELECT jsonb_agg(jsonb_strip_nulls(to_jsonb(r)) ORDER BY r.name)
               FROM user_roles ur
               JOIN roles r ON r.id = ur.role_id
               WHERE ur.user_id = u.id
           ), '[]'::jsonb) AS roles
    FROM users u
"#;

const SELECT_USER_ROLE: &str = r#"
    SELECT ur.id, ur.user_id, ur.role_id, ur.created_at,
           CASE WHEN u.id IS NULL THEN NULL
                ELSE jsonb_strip_nulls(to_jsonb(u) - 'password_hash') END AS "user",
           CASE WHEN r.id IS NULL THEN NULL ELSE jsonb_strip_nulls(to_jsonb(r)) END AS role
    FROM user_roles ur
    LEFT JOIN users u ON u.id = ur.user_id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

/// PostgreSQL implementation of AccessRepository
pub struct PgAccessRepository {
    pool: PgPool,
}

impl PgAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_role(row: PgRow) -> Role {
        Role {
            id: row.get("id"),
            name: row.get("name"),
            code: row.get("code"),
            description: row
                .get::<Option<String>, _>("description")
                .unwrap_or_default(),
            status: row
                .get::<Option<String>, _>("status")
                .as_deref()
                .map(Status::from_db)
                .unwrap_or_default(),
            created_at: row
                .get::<Option<DateTime<Utc>>, _>("created_at")
                .unwrap_or_default(),
        }
    }

    fn map_permission(row: PgRow) -> RolePermission {
        RolePermission {
            id: row.get("id"),
            role_id: row.get("role_id"),
            role: row.get::<Option<Json<Role>>, _>("role").map(|j| j.0),
            resource: row.get("resource"),
            action: PermissionAction::from_db(row.get::<&str, _>("action")),
            scope: PermissionScope::from_db(row.get::<&str, _>("scope")),
        }
    }

    async fn fetch_user(&self, id: Uuid) -> AppResult<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    #[instrument(skip(self))]
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        debug!("Listing roles");

        let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_ROLE))
            .map(Self::map_role)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing roles: {}", e);
                AppError::Database(format!("Failed to fetch roles: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_ROLE))
            .bind(id)
            .map(Self::map_role)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding role {}: {}", id, e);
                AppError::Database(format!("Failed to find role: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn list_resources(&self) -> AppResult<Vec<Resource>> {
        debug!("Listing resources");

        let rows = sqlx::query("SELECT id, name, code, description FROM resources ORDER BY name")
            .map(|row: PgRow| Resource {
                id: row.get("id"),
                name: row.get("name"),
                code: row.get("code"),
                description: row
                    .get::<Option<String>, _>("description")
                    .unwrap_or_default(),
            })
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing resources: {}", e);
                AppError::Database(format!("Failed to fetch resources: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self, role_id: Option<Uuid>) -> AppResult<Vec<RolePermission>> {
        debug!("Listing role permissions for {:?}", role_id);

        let rows = sqlx::query(&format!(
            "{} WHERE ($1::UUID IS NULL OR p.role_id = $1) ORDER BY p.resource, p.action",
            SELECT_PERMISSION
        ))
        .bind(role_id)
        .map(Self::map_permission)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing role permissions: {}", e);
            AppError::Database(format!("Failed to fetch role permissions: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self, permission))]
    async fn create_permission(&self, permission: &RolePermission) -> AppResult<RolePermission> {
        debug!(
            "Granting {} {} to role {}",
            permission.action, permission.resource, permission.role_id
        );

        sqlx::query(
            r#"
            INSERT INTO role_permissions (id, role_id, resource, action, scope)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(permission.id)
        .bind(permission.role_id)
        .bind(&permission.resource)
        .bind(permission.action.as_str())
        .bind(permission.scope.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating role permission: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists("Role permission already exists".to_string())
            } else {
                AppError::Database(format!("Failed to create role permission: {}", e))
            }
        })?;

        let row = sqlx::query(&format!("{} WHERE p.id = $1", SELECT_PERMISSION))
            .bind(permission.id)
            .map(Self::map_permission)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error reloading role permission: {}", e);
                AppError::Database(format!("Failed to fetch role permission: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting role permission {}: {}", id, e);
                AppError::Database(format!("Failed to delete role permission: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> AppResult<Vec<User>> {
        debug!("Listing users");

        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY u.created_at DESC", SELECT_USER))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing users: {}", e);
                AppError::Database(format!("Failed to fetch users: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding user {}: {}", id, e);
                AppError::Database(format!("Failed to find user: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE LOWER(u.email) = LOWER($1)",
            SELECT_USER
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user by email: {}", e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &User) -> AppResult<User> {
        debug!("Creating user: {}", user.email);

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating user: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!("User {} already exists", user.email))
            } else {
                AppError::Database(format!("Failed to create user: {}", e))
            }
        })?;

        info!("User {} created", user.email);
        self.fetch_user(user.id).await
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &User) -> AppResult<User> {
        debug!("Updating user: {}", user.id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, full_name = $3, password_hash = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating user {}: {}", user.id, e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!("User {} already exists", user.email))
            } else {
                AppError::Database(format!("Failed to update user: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {}", user.id)));
        }

        self.fetch_user(user.id).await
    }

    #[instrument(skip(self))]
    async fn list_user_roles(&self) -> AppResult<Vec<UserRole>> {
        debug!("Listing user roles");

        let rows = sqlx::query_as::<_, UserRoleRow>(&format!(
            "{} ORDER BY ur.created_at DESC",
            SELECT_USER_ROLE
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing user roles: {}", e);
            AppError::Database(format!("Failed to fetch user roles: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_user_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<Option<UserRole>> {
        let row = sqlx::query_as::<_, UserRoleRow>(&format!(
            "{} WHERE ur.user_id = $1 AND ur.role_id = $2",
            SELECT_USER_ROLE
        ))
        .bind(user_id)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user role: {}", e);
            AppError::Database(format!("Failed to find user role: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, link))]
    async fn create_user_role(&self, link: &UserRole) -> AppResult<UserRole> {
        debug!("Assigning role {} to user {}", link.role_id, link.user_id);

        sqlx::query(
            r#"
            INSERT INTO user_roles (id, user_id, role_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(link.id)
        .bind(link.user_id)
        .bind(link.role_id)
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating user role: {}", e);
            if is_unique_violation(&e) {
                AppError::AlreadyExists("User role already exists".to_string())
            } else {
                AppError::Database(format!("Failed to create user role: {}", e))
            }
        })?;

        self.find_user_role(link.user_id, link.role_id)
            .await?
            .ok_or_else(|| AppError::Internal("User role vanished after insert".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_user_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting user role: {}", e);
                AppError::Database(format!("Failed to delete user role: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    password_hash: Option<String>,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    roles: Json<Vec<Role>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name.unwrap_or_default(),
            password_hash: row.password_hash.unwrap_or_default(),
            status: row.status.as_deref().map(Status::from_db).unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            roles: Some(row.roles.0),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRoleRow {
    id: Uuid,
    user_id: Uuid,
    role_id: Uuid,
    created_at: Option<DateTime<Utc>>,
    user: Option<Json<User>>,
    role: Option<Json<Role>>,
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            role_id: row.role_id,
            user: row.user.map(|j| j.0),
            role: row.role.map(|j| j.0),
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}
