//! Repository bundle shared by services and handlers

use crate::memory::MemoryStore;
use crate::repositories::{
    PgAccessRepository, PgApplicationRepository, PgCatalogRepository, PgEnterpriseRepository,
    PgLicenseRepository, PgNumberRangeRepository, PgSubscriberRepository, PgSystemLogRepository,
    PgViolationRepository,
};
use ltra_core::traits::{
    AccessRepository, ApplicationRepository, CatalogRepository, EnterpriseRepository,
    LicenseRepository, NumberRangeRepository, SubscriberRepository, SystemLogRepository,
    ViolationRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

/// One trait object per repository, backed by Postgres or by memory
#[derive(Clone)]
pub struct Store {
    pub enterprises: Arc<dyn EnterpriseRepository>,
    pub licenses: Arc<dyn LicenseRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub number_ranges: Arc<dyn NumberRangeRepository>,
    pub subscribers: Arc<dyn SubscriberRepository>,
    pub violations: Arc<dyn ViolationRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub system_logs: Arc<dyn SystemLogRepository>,
    pub access: Arc<dyn AccessRepository>,
}

impl Store {
    /// Repositories over a PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            enterprises: Arc::new(PgEnterpriseRepository::new(pool.clone())),
            licenses: Arc::new(PgLicenseRepository::new(pool.clone())),
            applications: Arc::new(PgApplicationRepository::new(pool.clone())),
            number_ranges: Arc::new(PgNumberRangeRepository::new(pool.clone())),
            subscribers: Arc::new(PgSubscriberRepository::new(pool.clone())),
            violations: Arc::new(PgViolationRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
            system_logs: Arc::new(PgSystemLogRepository::new(pool.clone())),
            access: Arc::new(PgAccessRepository::new(pool)),
        }
    }

    /// Every repository served by the same memory store
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            enterprises: store.clone(),
            licenses: store.clone(),
            applications: store.clone(),
            number_ranges: store.clone(),
            subscribers: store.clone(),
            violations: store.clone(),
            catalog: store.clone(),
            system_logs: store.clone(),
            access: store,
        }
    }

    /// A fresh seeded memory store; used by tests and demo mode
    pub fn seeded() -> Self {
        Self::memory(Arc::new(MemoryStore::seeded()))
    }
}
