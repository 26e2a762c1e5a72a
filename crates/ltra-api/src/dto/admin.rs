//! Catalogue, role and user DTOs

use ltra_core::models::{
    LicenseCategory, LicenseType, PermissionAction, PermissionScope, ServiceGroup, ServiceType,
    Status,
};
use ltra_services::{NewUser, UserUpdate};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Catalogue
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceTypeRequest {
    #[validate(length(min = 1, max = 50, message = "Code is required"))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    pub group_type: ServiceGroup,

    #[serde(default)]
    pub requires_license: bool,

    #[serde(default)]
    pub status: Status,
}

impl From<ServiceTypeRequest> for ServiceType {
    fn from(req: ServiceTypeRequest) -> Self {
        ServiceType {
            code: req.code,
            name: req.name,
            group_type: req.group_type,
            requires_license: req.requires_license,
            status: req.status,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LicenseTypeRequest {
    #[validate(length(min = 1, max = 50, message = "Code is required"))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    pub category: LicenseCategory,

    #[serde(default = "default_has_expiry")]
    pub has_expiry: bool,

    #[serde(default)]
    pub status: Status,
}

fn default_has_expiry() -> bool {
    true
}

impl From<LicenseTypeRequest> for LicenseType {
    fn from(req: LicenseTypeRequest) -> Self {
        LicenseType {
            code: req.code,
            name: req.name,
            category: req.category,
            has_expiry: req.has_expiry,
            status: req.status,
            ..Default::default()
        }
    }
}

// ============================================================================
// Roles and permissions
// ============================================================================

/// `GET /role-permissions?role_id=` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionQuery {
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionRequest {
    pub role_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Resource is required"))]
    pub resource: String,

    pub action: PermissionAction,

    #[serde(default)]
    pub scope: PermissionScope,
}

/// `POST /user-roles` body and `DELETE /user-roles` query
#[derive(Debug, Clone, Deserialize)]
pub struct UserRoleRequest {
    pub user_id: Uuid,
    pub role_id: Uuid,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 8, message = "Password is too short"))]
    pub password: String,

    pub status: Option<Status>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            email: req.email,
            full_name: req.full_name,
            password: req.password,
            status: req.status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,

    pub status: Option<Status>,

    #[validate(length(min = 8, message = "Password is too short"))]
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        UserUpdate {
            full_name: req.full_name,
            status: req.status,
            password: req.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_request_defaults_scope() {
        let req: PermissionRequest = serde_json::from_str(
            r#"{"role_id": "00000000-0000-000c-0000-000000000004", "resource": "license", "action": "read"}"#,
        )
        .unwrap();
        assert_eq!(req.action, PermissionAction::Read);
        assert_eq!(req.scope, PermissionScope::default());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_license_type_request_defaults() {
        let req: LicenseTypeRequest =
            serde_json::from_str(r#"{"code": "SAT", "name": "Giấy phép vệ tinh"}"#).unwrap();
        let item: LicenseType = req.into();
        assert!(item.has_expiry);
        assert_eq!(item.status, Status::Active);
    }

    #[test]
    fn test_update_user_request_validation() {
        let req = UpdateUserRequest {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdateUserRequest::default().validate().is_ok());
    }
}
