//! In-memory storage backend
//!
//! Holds the demo dataset in process memory and implements every
//! repository trait over it. Each table sits behind its own
//! `parking_lot::RwLock`; locks are never held across an await and never
//! nested on the same table. Rows are stored without their related rows;
//! reads populate them from the other tables.

mod repos;
pub mod seed;

use ltra_core::models::{
    Application, ComplianceViolation, Enterprise, EnterpriseType, License, LicenseType,
    NumberRange, Resource, ResourceType, Role, RolePermission, ServiceType, Subscriber,
    SystemLog, User, UserRole,
};
use parking_lot::RwLock;
use uuid::Uuid;
use tracing::info;

/// Process-local store implementing all repository traits
#[derive(Default)]
pub struct MemoryStore {
    enterprise_types: RwLock<Vec<EnterpriseType>>,
    service_types: RwLock<Vec<ServiceType>>,
    license_types: RwLock<Vec<LicenseType>>,
    resource_types: RwLock<Vec<ResourceType>>,
    enterprises: RwLock<Vec<Enterprise>>,
    licenses: RwLock<Vec<License>>,
    applications: RwLock<Vec<Application>>,
    number_ranges: RwLock<Vec<NumberRange>>,
    subscribers: RwLock<Vec<Subscriber>>,
    violations: RwLock<Vec<ComplianceViolation>>,
    system_logs: RwLock<Vec<SystemLog>>,
    roles: RwLock<Vec<Role>>,
    resources: RwLock<Vec<Resource>>,
    role_permissions: RwLock<Vec<RolePermission>>,
    users: RwLock<Vec<User>>,
    user_roles: RwLock<Vec<UserRole>>,
}

impl MemoryStore {
    /// An empty store
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store loaded with the Lao telecom demo dataset
    pub fn seeded() -> Self {
        let store = Self {
            enterprise_types: RwLock::new(seed::enterprise_types()),
            service_types: RwLock::new(seed::service_types()),
            license_types: RwLock::new(seed::license_types()),
            resource_types: RwLock::new(seed::resource_types()),
            enterprises: RwLock::new(seed::enterprises()),
            licenses: RwLock::new(seed::licenses()),
            applications: RwLock::new(seed::applications()),
            number_ranges: RwLock::new(seed::number_ranges()),
            subscribers: RwLock::new(seed::subscribers()),
            violations: RwLock::new(seed::violations()),
            system_logs: RwLock::new(seed::system_logs()),
            roles: RwLock::new(seed::roles()),
            resources: RwLock::new(seed::resources()),
            role_permissions: RwLock::new(seed::role_permissions()),
            users: RwLock::new(seed::users()),
            user_roles: RwLock::new(seed::user_roles()),
        };
        info!(
            enterprises = store.enterprises.read().len(),
            applications = store.applications.read().len(),
            "Loaded demo dataset into memory store"
        );
        store
    }

    /// Give every user without a password the same hash.
    ///
    /// The demo dataset ships without credentials; this makes its accounts
    /// usable for sign-in.
    pub fn set_missing_password_hashes(&self, hash: &str) {
        let mut users = self.users.write();
        for user in users.iter_mut().filter(|u| u.password_hash.is_empty()) {
            user.password_hash = hash.to_string();
        }
    }

    fn enterprise_type(&self, id: Option<Uuid>) -> Option<EnterpriseType> {
        let id = id?;
        self.enterprise_types
            .read()
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    fn license_type(&self, id: Option<Uuid>) -> Option<LicenseType> {
        let id = id?;
        self.license_types.read().iter().find(|t| t.id == id).cloned()
    }

    /// Bare enterprise row, without its type
    fn enterprise_row(&self, id: Option<Uuid>) -> Option<Enterprise> {
        let id = id?;
        self.enterprises.read().iter().find(|e| e.id == id).cloned()
    }

    /// Bare license row, without related rows
    fn license_row(&self, id: Option<Uuid>) -> Option<License> {
        let id = id?;
        self.licenses.read().iter().find(|l| l.id == id).cloned()
    }

    fn range_row(&self, id: Option<Uuid>) -> Option<NumberRange> {
        let id = id?;
        self.number_ranges.read().iter().find(|r| r.id == id).cloned()
    }

    fn role_row(&self, id: Uuid) -> Option<Role> {
        self.roles.read().iter().find(|r| r.id == id).cloned()
    }

    fn populate_enterprise(&self, mut e: Enterprise) -> Enterprise {
        e.enterprise_type = self.enterprise_type(e.enterprise_type_id);
        e
    }

    fn populate_license(&self, mut l: License) -> License {
        l.enterprise = self.enterprise_row(Some(l.enterprise_id));
        l.license_type = self.license_type(l.license_type_id);
        l
    }

    fn populate_application(&self, mut a: Application) -> Application {
        a.enterprise = self.enterprise_row(Some(a.enterprise_id));
        a.license = self.license_row(a.license_id);
        a
    }

    fn populate_range(&self, mut r: NumberRange) -> NumberRange {
        r.telco = self.enterprise_row(r.telco_id);
        r.license = self.license_row(r.license_id);
        r
    }

    fn populate_subscriber(&self, mut s: Subscriber) -> Subscriber {
        s.telco = self.enterprise_row(s.telco_id);
        s.range = self.range_row(s.range_id);
        s
    }

    fn populate_violation(&self, mut v: ComplianceViolation) -> ComplianceViolation {
        v.license = self.license_row(v.license_id);
        v.enterprise = self.enterprise_row(v.enterprise_id);
        v
    }

    fn populate_permission(&self, mut p: RolePermission) -> RolePermission {
        p.role = self.role_row(p.role_id);
        p
    }

    fn roles_of(&self, user_id: Uuid) -> Vec<Role> {
        let role_ids: Vec<Uuid> = self
            .user_roles
            .read()
            .iter()
            .filter(|ur| ur.user_id == user_id)
            .map(|ur| ur.role_id)
            .collect();
        let mut roles: Vec<Role> = self
            .roles
            .read()
            .iter()
            .filter(|r| role_ids.contains(&r.id))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    fn populate_user(&self, mut u: User) -> User {
        u.roles = Some(self.roles_of(u.id));
        u
    }

    fn populate_user_role(&self, mut ur: UserRole) -> UserRole {
        ur.user = self
            .users
            .read()
            .iter()
            .find(|u| u.id == ur.user_id)
            .cloned()
            .map(|mut u| {
                u.password_hash.clear();
                u
            });
        ur.role = self.role_row(ur.role_id);
        ur
    }
}

/// Slice a filtered, ordered list into one page plus the total count
fn paginate<T>(items: Vec<T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let (page, total) = paginate((1..=10).collect::<Vec<_>>(), 3, 3);
        assert_eq!(page, vec![4, 5, 6]);
        assert_eq!(total, 10);

        let (page, total) = paginate(vec![1, 2], 50, 10);
        assert!(page.is_empty());
        assert_eq!(total, 2);
    }

    #[test]
    fn test_set_missing_password_hashes_only_fills_blanks() {
        let store = MemoryStore::seeded();
        {
            let mut users = store.users.write();
            users[0].password_hash = "existing".to_string();
        }
        store.set_missing_password_hashes("demo-hash");

        let users = store.users.read();
        assert_eq!(users[0].password_hash, "existing");
        assert!(users[1..].iter().all(|u| u.password_hash == "demo-hash"));
    }
}
