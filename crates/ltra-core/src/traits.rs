//! Common traits for repositories and caching
//!
//! Every storage backend (Postgres, in-memory mock data) implements the
//! same repository traits so services never know which one is active.

use crate::error::AppError;
use crate::models::{
    Application, ApplicationStatus, ComplianceViolation, Enterprise, EnterpriseType, License,
    LicenseStatus, LicenseType, NewSystemLog, NumberRange, Resource, ResourceStatus,
    ResourceType, Role, RolePermission, ServiceType, Status, Subscriber, SystemLog, User,
    UserRole, ViolationSeverity, ViolationStatus,
};
use crate::search::SearchQuery;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Generic repository trait for CRUD operations
///
/// Rows are never structurally deleted through this trait; lifecycle
/// changes go through status fields.
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID, with related rows populated
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;
}

/// Filters for the enterprise list page
#[derive(Debug, Clone, Default)]
pub struct EnterpriseFilter {
    pub search: Option<String>,
    pub status: Option<Status>,
}

/// Filters for the license list page
#[derive(Debug, Clone, Default)]
pub struct LicenseFilter {
    pub search: Option<String>,
    pub status: Option<LicenseStatus>,
    pub enterprise_id: Option<Uuid>,
}

/// Filters for the application list page
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
}

/// Filters for the number range list page
#[derive(Debug, Clone, Default)]
pub struct NumberRangeFilter {
    pub search: Option<String>,
    pub status: Option<ResourceStatus>,
    pub telco_id: Option<Uuid>,
}

/// Filters for the violation list page
#[derive(Debug, Clone, Default)]
pub struct ViolationFilter {
    pub search: Option<String>,
    pub status: Option<ViolationStatus>,
    pub severity: Option<ViolationSeverity>,
}

/// Enterprise repository
#[async_trait]
pub trait EnterpriseRepository: Repository<Enterprise, Uuid> {
    /// List enterprises ordered by name
    async fn list_filtered(
        &self,
        filter: &EnterpriseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Enterprise>, i64), AppError>;
}

/// License repository
#[async_trait]
pub trait LicenseRepository: Repository<License, Uuid> {
    /// List licenses, newest first
    async fn list_filtered(
        &self,
        filter: &LicenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<License>, i64), AppError>;

    /// Count licenses whose status is one of `statuses`
    async fn count_by_status(&self, statuses: &[LicenseStatus]) -> Result<i64, AppError>;

    /// Licenses issued per month of `year`, as (month 1..=12, count)
    async fn count_issued_by_month(&self, year: i32) -> Result<Vec<(u32, i64)>, AppError>;
}

/// Application repository
#[async_trait]
pub trait ApplicationRepository: Repository<Application, Uuid> {
    /// List applications, newest first
    async fn list_filtered(
        &self,
        filter: &ApplicationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Application>, i64), AppError>;

    /// Count applications whose status is one of `statuses`
    async fn count_by_status(&self, statuses: &[ApplicationStatus]) -> Result<i64, AppError>;

    /// Set the status; `submission_date` of `None` keeps the stored value
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        submission_date: Option<DateTime<Utc>>,
    ) -> Result<Application, AppError>;
}

/// Number range repository
#[async_trait]
pub trait NumberRangeRepository: Repository<NumberRange, Uuid> {
    /// List ranges ordered by prefix
    async fn list_filtered(
        &self,
        filter: &NumberRangeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<NumberRange>, i64), AppError>;

    /// Set the allocation status of a range
    async fn update_status(&self, id: Uuid, status: ResourceStatus)
        -> Result<NumberRange, AppError>;

    /// Total allocated block size per telco name, for ranges bound to a telco
    async fn allocated_by_telco(&self) -> Result<Vec<(String, i64)>, AppError>;
}

/// Subscriber repository
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// List subscribers ordered by MSISDN
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Subscriber>, i64), AppError>;

    /// Match MSISDN or SIM serial against a validated query
    async fn search(&self, query: &SearchQuery, limit: i64) -> Result<Vec<Subscriber>, AppError>;
}

/// Compliance violation repository
#[async_trait]
pub trait ViolationRepository: Repository<ComplianceViolation, Uuid> {
    /// List violations, most recently detected first
    async fn list_filtered(
        &self,
        filter: &ViolationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ComplianceViolation>, i64), AppError>;

    /// Count violations whose status is one of `statuses`
    async fn count_by_status(&self, statuses: &[ViolationStatus]) -> Result<i64, AppError>;
}

/// Reference catalogue repository
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_enterprise_types(&self) -> Result<Vec<EnterpriseType>, AppError>;
    async fn list_resource_types(&self) -> Result<Vec<ResourceType>, AppError>;

    async fn list_service_types(&self) -> Result<Vec<ServiceType>, AppError>;
    async fn find_service_type(&self, id: Uuid) -> Result<Option<ServiceType>, AppError>;
    async fn create_service_type(&self, item: &ServiceType) -> Result<ServiceType, AppError>;
    async fn update_service_type(&self, item: &ServiceType) -> Result<ServiceType, AppError>;

    async fn list_license_types(&self) -> Result<Vec<LicenseType>, AppError>;
    async fn find_license_type(&self, id: Uuid) -> Result<Option<LicenseType>, AppError>;
    async fn create_license_type(&self, item: &LicenseType) -> Result<LicenseType, AppError>;
    async fn update_license_type(&self, item: &LicenseType) -> Result<LicenseType, AppError>;
}

/// System log repository
#[async_trait]
pub trait SystemLogRepository: Send + Sync {
    /// Latest entries, newest first
    async fn recent(&self, limit: i64) -> Result<Vec<SystemLog>, AppError>;

    async fn create(&self, entry: &NewSystemLog) -> Result<SystemLog, AppError>;
}

/// Roles, permissions, users and their links
#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError>;
    async fn find_role(&self, id: Uuid) -> Result<Option<Role>, AppError>;
    async fn list_resources(&self) -> Result<Vec<Resource>, AppError>;

    /// Permissions, optionally restricted to one role, with the role populated
    async fn list_permissions(&self, role_id: Option<Uuid>)
        -> Result<Vec<RolePermission>, AppError>;
    async fn create_permission(&self, permission: &RolePermission)
        -> Result<RolePermission, AppError>;
    /// Returns false when no permission had that id
    async fn delete_permission(&self, id: Uuid) -> Result<bool, AppError>;

    /// Users with their roles populated
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn create_user(&self, user: &User) -> Result<User, AppError>;
    async fn update_user(&self, user: &User) -> Result<User, AppError>;

    /// User-role links with user and role populated, newest first
    async fn list_user_roles(&self) -> Result<Vec<UserRole>, AppError>;
    async fn find_user_role(&self, user_id: Uuid, role_id: Uuid)
        -> Result<Option<UserRole>, AppError>;
    async fn create_user_role(&self, link: &UserRole) -> Result<UserRole, AppError>;
    /// Returns false when the link did not exist
    async fn delete_user_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, AppError>;
}

/// Cache service trait
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Get value from cache
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError>;

    /// Set value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> Result<(), AppError>;

    /// Delete value from cache
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Check if key exists
    async fn exists(&self, key: &str) -> Result<bool, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 2000).per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        assert_eq!(PaginationMeta::new(95, 1, 10).total_pages, 10);
        assert_eq!(PaginationMeta::new(101, 1, 10).total_pages, 11);
        assert_eq!(PaginationMeta::new(0, 1, 50).total_pages, 0);
    }
}
