//! Business logic services for the LTRA console
//!
//! Services sit between the HTTP handlers and the repositories. They
//! validate input, apply the application workflow rules, write system
//! log entries for every mutation and keep the query cache fresh.
//!
//! # Services
//!
//! - `ApplicationService` - Application intake, status changes and the review board
//! - `DashboardService` - Headline counters and charts
//! - `EnterpriseService`, `LicenseService`, `ViolationService` - Registry CRUD
//! - `NumberRangeService` - Range allocation and revocation
//! - `SubscriberService` - Subscriber listing and lookup
//! - `CatalogService` - Reference catalogue
//! - `AccessService` - Roles, permissions and users
//! - `AuthService` - Sign-in and password changes
//! - `UploadService` - Usage-data upload checks
//! - `AuditService` - System log writer

pub mod access_service;
pub mod application_service;
pub mod audit;
pub mod auth_service;
pub mod catalog_service;
pub mod dashboard;
pub mod enterprise_service;
pub mod license_service;
pub mod number_range_service;
pub mod subscriber_service;
pub mod upload_service;
pub mod violation_service;

pub use access_service::{AccessService, NewUser, UserUpdate};
pub use application_service::ApplicationService;
pub use audit::AuditService;
pub use auth_service::{AuthService, LoginResult};
pub use catalog_service::CatalogService;
pub use dashboard::DashboardService;
pub use enterprise_service::EnterpriseService;
pub use license_service::{LicenseService, LicenseSummary};
pub use number_range_service::{NumberRangeService, NumberRangeSummary, RangeAllocation};
pub use subscriber_service::SubscriberService;
pub use upload_service::{UploadReport, UploadService};
pub use violation_service::{ViolationService, ViolationSummary};

use ltra_auth::JwtService;
use ltra_cache::QueryCache;
use ltra_core::traits::Pagination;
use ltra_db::Store;
use std::sync::Arc;

/// Business logic constants
pub mod constants {
    /// Entries returned by the system log page
    pub const SYSTEM_LOG_LIMIT: i64 = 100;

    /// Applications shown on the dashboard overview
    pub const RECENT_APPLICATIONS: i64 = 4;

    /// Violations shown on the dashboard overview
    pub const RECENT_VIOLATIONS: i64 = 3;

    /// Upper bound for queries that need every row (board, summaries)
    pub const ALL_ROWS: i64 = 10_000;

    /// Longest accepted application code
    pub const MAX_CODE_LEN: usize = 50;

    /// Generated application codes tried before giving up
    pub const CODE_ATTEMPTS: i64 = 20;

    /// Toast text for a duplicate role assignment
    pub const ROLE_ALREADY_ASSIGNED: &str = "Người dùng đã có vai trò này";

    /// Toast text for an upload with an unsupported extension
    pub const INVALID_FILE_FORMAT: &str = "Định dạng file không hợp lệ";

    /// Toast text for an accepted upload
    pub const UPLOAD_ACCEPTED: &str = "Đã xử lý thành công";

    pub const PERMISSION_GRANTED: &str = "Đã thêm quyền thành công";
    pub const PERMISSION_REVOKED: &str = "Đã xóa quyền thành công";
    pub const ROLE_ASSIGNED: &str = "Đã gán vai trò thành công";
    pub const ROLE_REMOVED: &str = "Đã xóa vai trò thành công";
}

/// Cache key suffix for one list page
pub(crate) fn page_params(pagination: &Pagination) -> String {
    format!("page={}:per_page={}", pagination.page, pagination.per_page)
}

/// Every service, wired to one store and one cache
#[derive(Clone)]
pub struct Services {
    pub applications: Arc<ApplicationService>,
    pub dashboard: Arc<DashboardService>,
    pub enterprises: Arc<EnterpriseService>,
    pub licenses: Arc<LicenseService>,
    pub violations: Arc<ViolationService>,
    pub number_ranges: Arc<NumberRangeService>,
    pub subscribers: Arc<SubscriberService>,
    pub catalog: Arc<CatalogService>,
    pub access: Arc<AccessService>,
    pub auth: Arc<AuthService>,
    pub uploads: Arc<UploadService>,
    pub audit: AuditService,
}

impl Services {
    pub fn new(store: &Store, cache: QueryCache, jwt: Arc<JwtService>) -> Self {
        let audit = AuditService::new(store.system_logs.clone());

        Self {
            applications: Arc::new(ApplicationService::new(store, audit.clone(), cache.clone())),
            dashboard: Arc::new(DashboardService::new(store, cache.clone())),
            enterprises: Arc::new(EnterpriseService::new(store, audit.clone(), cache.clone())),
            licenses: Arc::new(LicenseService::new(store, audit.clone(), cache.clone())),
            violations: Arc::new(ViolationService::new(store, audit.clone(), cache.clone())),
            number_ranges: Arc::new(NumberRangeService::new(store, audit.clone(), cache)),
            subscribers: Arc::new(SubscriberService::new(store)),
            catalog: Arc::new(CatalogService::new(store, audit.clone())),
            access: Arc::new(AccessService::new(store, audit.clone())),
            auth: Arc::new(AuthService::new(store, jwt, audit.clone())),
            uploads: Arc::new(UploadService::new(audit.clone())),
            audit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params() {
        assert_eq!(page_params(&Pagination::new(2, 50)), "page=2:per_page=50");
    }

    #[tokio::test]
    async fn test_services_share_one_store() {
        let store = Store::seeded();
        let services = Services::new(
            &store,
            QueryCache::disabled(),
            Arc::new(JwtService::new("test-secret-with-enough-length", 3600)),
        );

        services
            .uploads
            .check("usage.csv", b"msisdn\n02091234567\n", "staff1@ltra.gov.la")
            .await
            .unwrap();

        let logs = services.audit.recent().await.unwrap();
        assert_eq!(logs.len(), 5);
    }
}
