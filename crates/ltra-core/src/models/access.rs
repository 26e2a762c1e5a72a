//! Access control models: roles, resources, permissions, users
//!
//! Console roles form a strict hierarchy (admin > director > reviewer >
//! staff). A user holding several roles acts with the highest one.

use super::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Console role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Staff,
    Reviewer,
    Director,
    Admin,
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppRole::Staff => write!(f, "staff"),
            AppRole::Reviewer => write!(f, "reviewer"),
            AppRole::Director => write!(f, "director"),
            AppRole::Admin => write!(f, "admin"),
        }
    }
}

impl AppRole {
    /// Parse from a role code (case-insensitive)
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "staff" => Some(AppRole::Staff),
            "reviewer" => Some(AppRole::Reviewer),
            "director" => Some(AppRole::Director),
            "admin" => Some(AppRole::Admin),
            _ => None,
        }
    }

    /// Role hierarchy level (higher = more privileges)
    pub fn level(&self) -> u8 {
        match self {
            AppRole::Staff => 1,
            AppRole::Reviewer => 2,
            AppRole::Director => 3,
            AppRole::Admin => 4,
        }
    }

    /// True when this role grants at least the privileges of `required`
    pub fn has_role(&self, required: AppRole) -> bool {
        self.level() >= required.level()
    }

    /// Highest known role among a set of role codes
    pub fn highest<'a, I>(codes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes
            .into_iter()
            .filter_map(AppRole::from_code)
            .max_by_key(AppRole::level)
    }
}

string_enum! {
    pub enum PermissionAction {
        #[default]
        Read => "read",
        Create => "create",
        Edit => "edit",
        Delete => "delete",
    }
}

string_enum! {
    pub enum PermissionScope {
        #[default]
        Own => "own",
        Any => "any",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

/// A protected area of the console (licenses, applications, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePermission {
    pub id: Uuid,
    pub role_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub resource: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub action: PermissionAction,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub scope: PermissionScope,
}

/// Console user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    /// Password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Highest console role among the populated roles
    pub fn effective_role(&self) -> Option<AppRole> {
        self.roles
            .as_ref()
            .and_then(|roles| AppRole::highest(roles.iter().map(|r| r.code.as_str())))
    }
}

/// Link between a user and a role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}
