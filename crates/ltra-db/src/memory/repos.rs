//! Repository trait implementations for [`MemoryStore`]

use super::{paginate, MemoryStore};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use ltra_core::{
    models::{
        Application, ApplicationStatus, ComplianceViolation, Enterprise, EnterpriseType, License,
        LicenseStatus, LicenseType, NewSystemLog, NumberRange, Resource, ResourceStatus,
        ResourceType, Role, RolePermission, ServiceType, Subscriber, SystemLog, User, UserRole,
        ViolationStatus,
    },
    search::SearchQuery,
    traits::{
        AccessRepository, ApplicationFilter, ApplicationRepository, CatalogRepository,
        EnterpriseFilter, EnterpriseRepository, LicenseFilter, LicenseRepository,
        NumberRangeFilter, NumberRangeRepository, Repository, SubscriberRepository,
        SystemLogRepository, ViolationFilter, ViolationRepository,
    },
    AppError, AppResult,
};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Trimmed, non-empty search term
fn term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ==================== Enterprises ====================

#[async_trait]
impl Repository<Enterprise, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enterprise>> {
        let row = self.enterprise_row(Some(id));
        Ok(row.map(|e| self.populate_enterprise(e)))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Enterprise>> {
        let (items, _) =
            EnterpriseRepository::list_filtered(self, &EnterpriseFilter::default(), limit, offset)
                .await?;
        Ok(items)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.enterprises.read().len() as i64)
    }

    async fn create(&self, entity: &Enterprise) -> AppResult<Enterprise> {
        let mut row = entity.clone();
        row.enterprise_type = None;
        self.enterprises.write().push(row.clone());
        debug!("Stored enterprise {}", row.id);
        Ok(self.populate_enterprise(row))
    }

    async fn update(&self, entity: &Enterprise) -> AppResult<Enterprise> {
        let updated = {
            let mut rows = self.enterprises.write();
            let row = rows
                .iter_mut()
                .find(|e| e.id == entity.id)
                .ok_or_else(|| AppError::NotFound(format!("Enterprise {}", entity.id)))?;
            row.name = entity.name.clone();
            row.tax_code = entity.tax_code.clone();
            row.representative = entity.representative.clone();
            row.enterprise_type_id = entity.enterprise_type_id;
            row.status = entity.status;
            row.clone()
        };
        Ok(self.populate_enterprise(updated))
    }
}

#[async_trait]
impl EnterpriseRepository for MemoryStore {
    async fn list_filtered(
        &self,
        filter: &EnterpriseFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Enterprise>, i64)> {
        let mut rows: Vec<Enterprise> = self
            .enterprises
            .read()
            .iter()
            .filter(|e| term(&filter.search).map_or(true, |t| e.matches(t)))
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        let (page, total) = paginate(rows, limit, offset);
        Ok((
            page.into_iter()
                .map(|e| self.populate_enterprise(e))
                .collect(),
            total,
        ))
    }
}

// ==================== Licenses ====================

impl MemoryStore {
    fn licenses_populated(&self) -> Vec<License> {
        let rows: Vec<License> = self.licenses.read().clone();
        rows.into_iter().map(|l| self.populate_license(l)).collect()
    }
}

#[async_trait]
impl Repository<License, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<License>> {
        let row = self.license_row(Some(id));
        Ok(row.map(|l| self.populate_license(l)))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<License>> {
        let (items, _) =
            LicenseRepository::list_filtered(self, &LicenseFilter::default(), limit, offset)
                .await?;
        Ok(items)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.licenses.read().len() as i64)
    }

    async fn create(&self, entity: &License) -> AppResult<License> {
        let mut row = entity.clone();
        row.enterprise = None;
        row.license_type = None;
        {
            let mut rows = self.licenses.write();
            if rows.iter().any(|l| l.license_number == row.license_number) {
                return Err(AppError::AlreadyExists(format!(
                    "License {} already exists",
                    row.license_number
                )));
            }
            rows.push(row.clone());
        }
        Ok(self.populate_license(row))
    }

    async fn update(&self, entity: &License) -> AppResult<License> {
        let updated = {
            let mut rows = self.licenses.write();
            let row = rows
                .iter_mut()
                .find(|l| l.id == entity.id)
                .ok_or_else(|| AppError::NotFound(format!("License {}", entity.id)))?;
            row.license_number = entity.license_number.clone();
            row.enterprise_id = entity.enterprise_id;
            row.license_type_id = entity.license_type_id;
            row.issue_date = entity.issue_date;
            row.expiry_date = entity.expiry_date;
            row.status = entity.status;
            row.file_url = entity.file_url.clone();
            row.clone()
        };
        Ok(self.populate_license(updated))
    }
}

#[async_trait]
impl LicenseRepository for MemoryStore {
    async fn list_filtered(
        &self,
        filter: &LicenseFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<License>, i64)> {
        let mut rows: Vec<License> = self
            .licenses_populated()
            .into_iter()
            .filter(|l| term(&filter.search).map_or(true, |t| l.matches(t)))
            .filter(|l| filter.status.map_or(true, |s| l.status == s))
            .filter(|l| filter.enterprise_id.map_or(true, |id| l.enterprise_id == id))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, limit, offset))
    }

    async fn count_by_status(&self, statuses: &[LicenseStatus]) -> AppResult<i64> {
        Ok(self
            .licenses
            .read()
            .iter()
            .filter(|l| statuses.contains(&l.status))
            .count() as i64)
    }

    async fn count_issued_by_month(&self, year: i32) -> AppResult<Vec<(u32, i64)>> {
        let mut months: BTreeMap<u32, i64> = BTreeMap::new();
        for license in self.licenses.read().iter() {
            if license.issue_date.year() == year {
                *months.entry(license.issue_date.month()).or_default() += 1;
            }
        }
        Ok(months.into_iter().collect())
    }
}

// ==================== Applications ====================

#[async_trait]
impl Repository<Application, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        let row = self
            .applications
            .read()
            .iter()
            .find(|a| a.id == id)
            .cloned();
        Ok(row.map(|a| self.populate_application(a)))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Application>> {
        let (items, _) = ApplicationRepository::list_filtered(
            self,
            &ApplicationFilter::default(),
            limit,
            offset,
        )
        .await?;
        Ok(items)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.applications.read().len() as i64)
    }

    async fn create(&self, entity: &Application) -> AppResult<Application> {
        let mut row = entity.clone();
        row.enterprise = None;
        row.license = None;
        {
            let mut rows = self.applications.write();
            if rows.iter().any(|a| a.code == row.code) {
                return Err(AppError::AlreadyExists(format!(
                    "Application {} already exists",
                    row.code
                )));
            }
            rows.push(row.clone());
        }
        debug!("Stored application {}", row.code);
        Ok(self.populate_application(row))
    }

    async fn update(&self, entity: &Application) -> AppResult<Application> {
        let updated = {
            let mut rows = self.applications.write();
            let row = rows
                .iter_mut()
                .find(|a| a.id == entity.id)
                .ok_or_else(|| AppError::NotFound(format!("Application {}", entity.id)))?;
            row.code = entity.code.clone();
            row.enterprise_id = entity.enterprise_id;
            row.license_id = entity.license_id;
            row.application_type = entity.application_type;
            row.status = entity.status;
            row.workflow_step_id = entity.workflow_step_id;
            row.submission_date = entity.submission_date;
            row.clone()
        };
        Ok(self.populate_application(updated))
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn list_filtered(
        &self,
        filter: &ApplicationFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Application>, i64)> {
        let rows: Vec<Application> = self.applications.read().clone();
        let mut rows: Vec<Application> = rows
            .into_iter()
            .map(|a| self.populate_application(a))
            .filter(|a| term(&filter.search).map_or(true, |t| a.matches(t)))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, limit, offset))
    }

    async fn count_by_status(&self, statuses: &[ApplicationStatus]) -> AppResult<i64> {
        Ok(self
            .applications
            .read()
            .iter()
            .filter(|a| statuses.contains(&a.status))
            .count() as i64)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        submission_date: Option<DateTime<Utc>>,
    ) -> AppResult<Application> {
        let updated = {
            let mut rows = self.applications.write();
            let row = rows
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Application {}", id)))?;
            row.status = status;
            if submission_date.is_some() {
                row.submission_date = submission_date;
            }
            row.clone()
        };
        Ok(self.populate_application(updated))
    }
}

// ==================== Number ranges ====================

#[async_trait]
impl Repository<NumberRange, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NumberRange>> {
        let row = self.range_row(Some(id));
        Ok(row.map(|r| self.populate_range(r)))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<NumberRange>> {
        let (items, _) = NumberRangeRepository::list_filtered(
            self,
            &NumberRangeFilter::default(),
            limit,
            offset,
        )
        .await?;
        Ok(items)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.number_ranges.read().len() as i64)
    }

    async fn create(&self, entity: &NumberRange) -> AppResult<NumberRange> {
        let mut row = entity.clone();
        row.telco = None;
        row.license = None;
        row.usage_percent = Some(row.usage_percent.unwrap_or(0));
        self.number_ranges.write().push(row.clone());
        Ok(self.populate_range(row))
    }

    async fn update(&self, entity: &NumberRange) -> AppResult<NumberRange> {
        let updated = {
            let mut rows = self.number_ranges.write();
            let row = rows
                .iter_mut()
                .find(|r| r.id == entity.id)
                .ok_or_else(|| AppError::NotFound(format!("Number range {}", entity.id)))?;
            row.prefix = entity.prefix.clone();
            row.start_number = entity.start_number.clone();
            row.end_number = entity.end_number.clone();
            row.block_size = entity.block_size;
            row.telco_id = entity.telco_id;
            row.license_id = entity.license_id;
            row.status = entity.status;
            row.clone()
        };
        Ok(self.populate_range(updated))
    }
}

#[async_trait]
impl NumberRangeRepository for MemoryStore {
    async fn list_filtered(
        &self,
        filter: &NumberRangeFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<NumberRange>, i64)> {
        let rows: Vec<NumberRange> = self.number_ranges.read().clone();
        let mut rows: Vec<NumberRange> = rows
            .into_iter()
            .map(|r| self.populate_range(r))
            .filter(|r| term(&filter.search).map_or(true, |t| r.matches(t)))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.telco_id.map_or(true, |id| r.telco_id == Some(id)))
            .collect();
        rows.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        Ok(paginate(rows, limit, offset))
    }

    async fn update_status(&self, id: Uuid, status: ResourceStatus) -> AppResult<NumberRange> {
        let updated = {
            let mut rows = self.number_ranges.write();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Number range {}", id)))?;
            row.status = status;
            row.clone()
        };
        Ok(self.populate_range(updated))
    }

    async fn allocated_by_telco(&self) -> AppResult<Vec<(String, i64)>> {
        let rows: Vec<NumberRange> = self.number_ranges.read().clone();
        let mut totals: BTreeMap<String, i64> = BTreeMap::new();
        for range in rows
            .into_iter()
            .filter(|r| r.status != ResourceStatus::Revoked)
        {
            if let Some(telco) = self.enterprise_row(range.telco_id) {
                *totals.entry(telco.name).or_default() += range.block_size;
            }
        }

        let mut totals: Vec<(String, i64)> = totals.into_iter().collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(totals)
    }
}

// ==================== Subscribers ====================

#[async_trait]
impl SubscriberRepository for MemoryStore {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Subscriber>, i64)> {
        let mut rows: Vec<Subscriber> = self.subscribers.read().clone();
        rows.sort_by(|a, b| a.msisdn.cmp(&b.msisdn));
        let (page, total) = paginate(rows, limit, offset);
        Ok((
            page.into_iter()
                .map(|s| self.populate_subscriber(s))
                .collect(),
            total,
        ))
    }

    async fn search(&self, query: &SearchQuery, limit: i64) -> AppResult<Vec<Subscriber>> {
        let mut rows: Vec<Subscriber> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.matches(query.term()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.msisdn.cmp(&b.msisdn));
        Ok(rows
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|s| self.populate_subscriber(s))
            .collect())
    }
}

// ==================== Violations ====================

#[async_trait]
impl Repository<ComplianceViolation, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ComplianceViolation>> {
        let row = self.violations.read().iter().find(|v| v.id == id).cloned();
        Ok(row.map(|v| self.populate_violation(v)))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<ComplianceViolation>> {
        let (items, _) =
            ViolationRepository::list_filtered(self, &ViolationFilter::default(), limit, offset)
                .await?;
        Ok(items)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.violations.read().len() as i64)
    }

    async fn create(&self, entity: &ComplianceViolation) -> AppResult<ComplianceViolation> {
        let mut row = entity.clone();
        row.license = None;
        row.enterprise = None;
        self.violations.write().push(row.clone());
        Ok(self.populate_violation(row))
    }

    async fn update(&self, entity: &ComplianceViolation) -> AppResult<ComplianceViolation> {
        let updated = {
            let mut rows = self.violations.write();
            let row = rows
                .iter_mut()
                .find(|v| v.id == entity.id)
                .ok_or_else(|| AppError::NotFound(format!("Violation {}", entity.id)))?;
            row.detection_date = entity.detection_date;
            row.license_id = entity.license_id;
            row.enterprise_id = entity.enterprise_id;
            row.violation_type = entity.violation_type.clone();
            row.description = entity.description.clone();
            row.severity = entity.severity;
            row.status = entity.status;
            row.clone()
        };
        Ok(self.populate_violation(updated))
    }
}

#[async_trait]
impl ViolationRepository for MemoryStore {
    async fn list_filtered(
        &self,
        filter: &ViolationFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<ComplianceViolation>, i64)> {
        let rows: Vec<ComplianceViolation> = self.violations.read().clone();
        let mut rows: Vec<ComplianceViolation> = rows
            .into_iter()
            .map(|v| self.populate_violation(v))
            .filter(|v| term(&filter.search).map_or(true, |t| v.matches(t)))
            .filter(|v| filter.status.map_or(true, |s| v.status == s))
            .filter(|v| filter.severity.map_or(true, |s| v.severity == s))
            .collect();
        rows.sort_by(|a, b| b.detection_date.cmp(&a.detection_date));
        Ok(paginate(rows, limit, offset))
    }

    async fn count_by_status(&self, statuses: &[ViolationStatus]) -> AppResult<i64> {
        Ok(self
            .violations
            .read()
            .iter()
            .filter(|v| statuses.contains(&v.status))
            .count() as i64)
    }
}

// ==================== Catalogue ====================

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_enterprise_types(&self) -> AppResult<Vec<EnterpriseType>> {
        let mut rows = self.enterprise_types.read().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        let mut rows = self.resource_types.read().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_service_types(&self) -> AppResult<Vec<ServiceType>> {
        let mut rows = self.service_types.read().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_service_type(&self, id: Uuid) -> AppResult<Option<ServiceType>> {
        Ok(self
            .service_types
            .read()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn create_service_type(&self, item: &ServiceType) -> AppResult<ServiceType> {
        let mut rows = self.service_types.write();
        if rows.iter().any(|t| t.code == item.code) {
            return Err(AppError::AlreadyExists(format!(
                "Service type {} already exists",
                item.code
            )));
        }
        rows.push(item.clone());
        Ok(item.clone())
    }

    async fn update_service_type(&self, item: &ServiceType) -> AppResult<ServiceType> {
        let mut rows = self.service_types.write();
        let row = rows
            .iter_mut()
            .find(|t| t.id == item.id)
            .ok_or_else(|| AppError::NotFound(format!("Service type {}", item.id)))?;
        *row = item.clone();
        Ok(row.clone())
    }

    async fn list_license_types(&self) -> AppResult<Vec<LicenseType>> {
        let mut rows = self.license_types.read().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_license_type(&self, id: Uuid) -> AppResult<Option<LicenseType>> {
        Ok(self.license_type(Some(id)))
    }

    async fn create_license_type(&self, item: &LicenseType) -> AppResult<LicenseType> {
        let mut rows = self.license_types.write();
        if rows.iter().any(|t| t.code == item.code) {
            return Err(AppError::AlreadyExists(format!(
                "License type {} already exists",
                item.code
            )));
        }
        rows.push(item.clone());
        Ok(item.clone())
    }

    async fn update_license_type(&self, item: &LicenseType) -> AppResult<LicenseType> {
        let mut rows = self.license_types.write();
        let row = rows
            .iter_mut()
            .find(|t| t.id == item.id)
            .ok_or_else(|| AppError::NotFound(format!("License type {}", item.id)))?;
        *row = item.clone();
        Ok(row.clone())
    }
}

// ==================== System logs ====================

#[async_trait]
impl SystemLogRepository for MemoryStore {
    async fn recent(&self, limit: i64) -> AppResult<Vec<SystemLog>> {
        let mut rows = self.system_logs.read().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn create(&self, entry: &NewSystemLog) -> AppResult<SystemLog> {
        let log = SystemLog {
            id: Uuid::new_v4(),
            action: entry.action.clone(),
            actor: entry.actor.clone(),
            target_entity: entry.target_entity.clone(),
            target_id: entry.target_id.clone(),
            details: entry.details.clone(),
            created_at: Utc::now(),
        };
        self.system_logs.write().push(log.clone());
        Ok(log)
    }
}

// ==================== Access control ====================

#[async_trait]
impl AccessRepository for MemoryStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut rows = self.roles.read().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.role_row(id))
    }

    async fn list_resources(&self) -> AppResult<Vec<Resource>> {
        let mut rows = self.resources.read().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_permissions(&self, role_id: Option<Uuid>) -> AppResult<Vec<RolePermission>> {
        let rows: Vec<RolePermission> = self
            .role_permissions
            .read()
            .iter()
            .filter(|p| role_id.map_or(true, |id| p.role_id == id))
            .cloned()
            .collect();
        let mut rows: Vec<RolePermission> = rows
            .into_iter()
            .map(|p| self.populate_permission(p))
            .collect();
        rows.sort_by(|a, b| {
            a.resource
                .cmp(&b.resource)
                .then_with(|| a.action.as_str().cmp(b.action.as_str()))
        });
        Ok(rows)
    }

    async fn create_permission(&self, permission: &RolePermission) -> AppResult<RolePermission> {
        let mut row = permission.clone();
        row.role = None;
        {
            let mut rows = self.role_permissions.write();
            if rows.iter().any(|p| {
                p.role_id == row.role_id && p.resource == row.resource && p.action == row.action
            }) {
                return Err(AppError::AlreadyExists(
                    "Role permission already exists".to_string(),
                ));
            }
            rows.push(row.clone());
        }
        Ok(self.populate_permission(row))
    }

    async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.role_permissions.write();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut rows: Vec<User> = self.users.read().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows.into_iter().map(|u| self.populate_user(u)).collect())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = self.users.read().iter().find(|u| u.id == id).cloned();
        Ok(row.map(|u| self.populate_user(u)))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = self
            .users
            .read()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(row.map(|u| self.populate_user(u)))
    }

    async fn create_user(&self, user: &User) -> AppResult<User> {
        let mut row = user.clone();
        row.roles = None;
        {
            let mut rows = self.users.write();
            if rows.iter().any(|u| u.email.eq_ignore_ascii_case(&row.email)) {
                return Err(AppError::AlreadyExists(format!(
                    "User {} already exists",
                    row.email
                )));
            }
            rows.push(row.clone());
        }
        Ok(self.populate_user(row))
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let updated = {
            let mut rows = self.users.write();
            if rows
                .iter()
                .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
            {
                return Err(AppError::AlreadyExists(format!(
                    "User {} already exists",
                    user.email
                )));
            }
            let row = rows
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| AppError::NotFound(format!("User {}", user.id)))?;
            row.email = user.email.clone();
            row.full_name = user.full_name.clone();
            row.password_hash = user.password_hash.clone();
            row.status = user.status;
            row.clone()
        };
        Ok(self.populate_user(updated))
    }

    async fn list_user_roles(&self) -> AppResult<Vec<UserRole>> {
        let mut rows: Vec<UserRole> = self.user_roles.read().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .map(|ur| self.populate_user_role(ur))
            .collect())
    }

    async fn find_user_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<Option<UserRole>> {
        let row = self
            .user_roles
            .read()
            .iter()
            .find(|ur| ur.user_id == user_id && ur.role_id == role_id)
            .cloned();
        Ok(row.map(|ur| self.populate_user_role(ur)))
    }

    async fn create_user_role(&self, link: &UserRole) -> AppResult<UserRole> {
        let mut row = link.clone();
        row.user = None;
        row.role = None;
        {
            let mut rows = self.user_roles.write();
            if rows
                .iter()
                .any(|ur| ur.user_id == row.user_id && ur.role_id == row.role_id)
            {
                return Err(AppError::AlreadyExists(
                    "User role already exists".to_string(),
                ));
            }
            rows.push(row.clone());
        }
        Ok(self.populate_user_role(row))
    }

    async fn delete_user_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let mut rows = self.user_roles.write();
        let before = rows.len();
        rows.retain(|ur| !(ur.user_id == user_id && ur.role_id == role_id));
        Ok(rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::super::seed::ids;
    use super::*;
    use ltra_core::models::ViolationSeverity;

    #[tokio::test]
    async fn test_enterprises_sorted_by_name_with_type() {
        let store = MemoryStore::seeded();
        let (items, total) =
            EnterpriseRepository::list_filtered(&store, &EnterpriseFilter::default(), 50, 0)
                .await
                .unwrap();

        assert_eq!(total, 4);
        assert_eq!(items[0].name, "ETL (Enterprise of Telecommunications Lao)");
        assert_eq!(
            items[0].enterprise_type.as_ref().map(|t| t.code.as_str()),
            Some("TELCO")
        );
    }

    #[tokio::test]
    async fn test_application_list_is_newest_first_and_populated() {
        let store = MemoryStore::seeded();
        let (items, _) =
            ApplicationRepository::list_filtered(&store, &ApplicationFilter::default(), 50, 0)
                .await
                .unwrap();

        let codes: Vec<&str> = items.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["HS-2024-004", "HS-2024-002", "HS-2024-001", "HS-2024-003"]
        );
        assert_eq!(
            items[0].enterprise.as_ref().map(|e| e.name.as_str()),
            Some("TPlus")
        );
        assert!(items[1].license.is_some());
    }

    #[tokio::test]
    async fn test_application_search_matches_enterprise_name() {
        let store = MemoryStore::seeded();
        let filter = ApplicationFilter {
            search: Some("unitel".to_string()),
            status: None,
        };
        let (items, total) = ApplicationRepository::list_filtered(&store, &filter, 50, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].code, "HS-2024-001");
    }

    #[tokio::test]
    async fn test_update_status_keeps_existing_submission_date() {
        let store = MemoryStore::seeded();
        let before = Repository::<Application, Uuid>::find_by_id(&store, ids::application(1))
            .await
            .unwrap()
            .unwrap();

        let after = ApplicationRepository::update_status(
            &store,
            ids::application(1),
            ApplicationStatus::Approved,
            None,
        )
        .await
        .unwrap();

        assert_eq!(after.status, ApplicationStatus::Approved);
        assert_eq!(after.submission_date, before.submission_date);
    }

    #[tokio::test]
    async fn test_update_status_unknown_id_is_not_found() {
        let store = MemoryStore::seeded();
        let result = ApplicationRepository::update_status(
            &store,
            Uuid::new_v4(),
            ApplicationStatus::Draft,
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_application_code_rejected() {
        let store = MemoryStore::seeded();
        let app = Application {
            id: Uuid::new_v4(),
            code: "HS-2024-001".to_string(),
            enterprise_id: ids::enterprise(1),
            ..Default::default()
        };
        let result = Repository::<Application, Uuid>::create(&store, &app).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_status_counts_match_dataset() {
        let store = MemoryStore::seeded();
        assert_eq!(
            LicenseRepository::count_by_status(&store, &[LicenseStatus::Active])
                .await
                .unwrap(),
            4
        );
        assert_eq!(
            ApplicationRepository::count_by_status(
                &store,
                &[ApplicationStatus::Submitted, ApplicationStatus::Reviewing]
            )
            .await
            .unwrap(),
            2
        );
        assert_eq!(
            ViolationRepository::count_by_status(&store, &[ViolationStatus::New])
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            Repository::<NumberRange, Uuid>::count(&store).await.unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_licenses_issued_by_month() {
        let store = MemoryStore::seeded();
        let months = store.count_issued_by_month(2024).await.unwrap();
        assert_eq!(months, vec![(1, 1), (3, 1), (8, 1)]);
    }

    #[tokio::test]
    async fn test_subscriber_search_is_case_insensitive() {
        let store = MemoryStore::seeded();
        let query = SearchQuery::parse("sim-ltc").unwrap();
        let found = store.search(&query, 50).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].msisdn, "02059876543");
        assert!(found[0].telco.is_some());
        assert!(found[0].range.is_some());
    }

    #[tokio::test]
    async fn test_violation_filters() {
        let store = MemoryStore::seeded();
        let filter = ViolationFilter {
            severity: Some(ViolationSeverity::Medium),
            ..Default::default()
        };
        let (items, total) = ViolationRepository::list_filtered(&store, &filter, 50, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].status, ViolationStatus::Investigating);
    }

    #[tokio::test]
    async fn test_user_roles_populated_and_admin_has_two_roles() {
        let store = MemoryStore::seeded();
        let admin = store
            .find_user_by_email("ADMIN@ltra.gov.la")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.roles.as_ref().map(Vec::len), Some(2));

        let links = store.list_user_roles().await.unwrap();
        assert_eq!(links.len(), 6);
        assert!(links.iter().all(|l| l.user.is_some() && l.role.is_some()));
    }

    #[tokio::test]
    async fn test_delete_user_role() {
        let store = MemoryStore::seeded();
        assert!(store
            .delete_user_role(ids::user(1), ids::role(2))
            .await
            .unwrap());
        assert!(!store
            .delete_user_role(ids::user(1), ids::role(2))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_allocated_by_telco_skips_unassigned() {
        let store = MemoryStore::seeded();
        let totals = store.allocated_by_telco().await.unwrap();
        assert_eq!(totals.len(), 4);
        assert!(totals.iter().all(|(_, size)| *size == 10_000_000));
    }

    #[tokio::test]
    async fn test_recent_logs_newest_first() {
        let store = MemoryStore::seeded();
        let logs = store.recent(100).await.unwrap();
        assert_eq!(logs.len(), 4);
        assert_eq!(logs[0].action, "UPDATE_STATUS");
    }
}
