//! Demo dataset for the in-memory backend
//!
//! Lao telecom operators, their licenses and number ranges, a handful of
//! applications, subscribers and violations, and the four console roles.
//! Ids are deterministic so tests and fixtures can refer to them.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ltra_core::models::{
    ActivationStatus, Application, ApplicationStatus, ApplicationType, ComplianceViolation,
    Enterprise, EnterpriseType, License, LicenseCategory, LicenseStatus, LicenseType,
    NumberRange, PermissionAction, PermissionScope, Resource, ResourceStatus, ResourceType, Role,
    RolePermission, ServiceGroup, ServiceType, Status, Subscriber, SubscriberType, SystemLog,
    User, UserRole, ViolationSeverity, ViolationStatus,
};

/// Deterministic ids, one namespace per table
pub mod ids {
    use uuid::Uuid;

    const fn seed_id(table: u128, n: u128) -> Uuid {
        Uuid::from_u128((table << 64) | n)
    }

    pub const fn enterprise_type(n: u128) -> Uuid {
        seed_id(0x01, n)
    }
    pub const fn license_type(n: u128) -> Uuid {
        seed_id(0x02, n)
    }
    pub const fn service_type(n: u128) -> Uuid {
        seed_id(0x03, n)
    }
    pub const fn resource_type(n: u128) -> Uuid {
        seed_id(0x04, n)
    }
    pub const fn enterprise(n: u128) -> Uuid {
        seed_id(0x05, n)
    }
    pub const fn license(n: u128) -> Uuid {
        seed_id(0x06, n)
    }
    pub const fn application(n: u128) -> Uuid {
        seed_id(0x07, n)
    }
    pub const fn number_range(n: u128) -> Uuid {
        seed_id(0x08, n)
    }
    pub const fn subscriber(n: u128) -> Uuid {
        seed_id(0x09, n)
    }
    pub const fn violation(n: u128) -> Uuid {
        seed_id(0x0a, n)
    }
    pub const fn system_log(n: u128) -> Uuid {
        seed_id(0x0b, n)
    }
    pub const fn role(n: u128) -> Uuid {
        seed_id(0x0c, n)
    }
    pub const fn resource(n: u128) -> Uuid {
        seed_id(0x0d, n)
    }
    pub const fn role_permission(n: u128) -> Uuid {
        seed_id(0x0e, n)
    }
    pub const fn user(n: u128) -> Uuid {
        seed_id(0x0f, n)
    }
    pub const fn user_role(n: u128) -> Uuid {
        seed_id(0x10, n)
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    at(y, m, d, 0, 0)
}

pub fn enterprise_types() -> Vec<EnterpriseType> {
    [
        (1, "TELCO", "Nhà cung cấp viễn thông"),
        (2, "ISP", "Nhà cung cấp dịch vụ Internet"),
        (3, "VAS", "Nhà cung cấp dịch vụ giá trị gia tăng"),
        (4, "OTT", "Nhà cung cấp dịch vụ OTT"),
    ]
    .into_iter()
    .map(|(n, code, name)| EnterpriseType {
        id: ids::enterprise_type(n),
        code: code.to_string(),
        name: name.to_string(),
        status: Status::Active,
        created_at: day(2024, 1, 1),
    })
    .collect()
}

pub fn license_types() -> Vec<LicenseType> {
    [
        (1, "NET_LICENSE", "Giấy phép thiết lập mạng viễn thông", LicenseCategory::Enterprise),
        (2, "SVC_LICENSE", "Giấy phép cung cấp dịch vụ", LicenseCategory::Service),
        (3, "NUM_LICENSE", "Giấy phép sử dụng kho số", LicenseCategory::Resource),
        (4, "FREQ_LICENSE", "Giấy phép sử dụng tần số", LicenseCategory::Resource),
    ]
    .into_iter()
    .map(|(n, code, name, category)| LicenseType {
        id: ids::license_type(n),
        code: code.to_string(),
        name: name.to_string(),
        category,
        has_expiry: true,
        status: Status::Active,
    })
    .collect()
}

pub fn service_types() -> Vec<ServiceType> {
    [
        (1, "MOBILE", "Dịch vụ di động", ServiceGroup::Telecom, true),
        (2, "FIXED", "Dịch vụ cố định", ServiceGroup::Telecom, true),
        (3, "INTERNET", "Dịch vụ Internet", ServiceGroup::Telecom, true),
        (4, "SMS", "Dịch vụ tin nhắn", ServiceGroup::Vas, true),
        (5, "STREAMING", "Dịch vụ phát trực tuyến", ServiceGroup::Ott, false),
    ]
    .into_iter()
    .map(|(n, code, name, group_type, requires_license)| ServiceType {
        id: ids::service_type(n),
        code: code.to_string(),
        name: name.to_string(),
        group_type,
        requires_license,
        status: Status::Active,
    })
    .collect()
}

pub fn resource_types() -> Vec<ResourceType> {
    [
        (1, "MOBILE_PREFIX", "Mã mạng di động", "^02[0-9]{2}$"),
        (2, "SHORT_CODE", "Mã số ngắn", "^[0-9]{3,5}$"),
    ]
    .into_iter()
    .map(|(n, code, name, rule)| ResourceType {
        id: ids::resource_type(n),
        code: code.to_string(),
        name: name.to_string(),
        format_rule: rule.to_string(),
        status: Status::Active,
    })
    .collect()
}

pub fn enterprises() -> Vec<Enterprise> {
    [
        (1, "Unitel (Star Telecom)", "0100123456789", "Mr. Sommay Phomsoupha", day(2020, 1, 15)),
        (2, "LTC (Lao Telecom)", "0100234567890", "Mr. Khammoune Viphongxay", day(2019, 6, 20)),
        (
            3,
            "ETL (Enterprise of Telecommunications Lao)",
            "0100345678901",
            "Ms. Chanthaphone Phommachan",
            day(2018, 3, 10),
        ),
        (4, "TPlus", "0100456789012", "Mr. Bounleuth Sengsavang", day(2021, 8, 5)),
    ]
    .into_iter()
    .map(|(n, name, tax_code, representative, created_at)| Enterprise {
        id: ids::enterprise(n),
        name: name.to_string(),
        tax_code: tax_code.to_string(),
        representative: representative.to_string(),
        enterprise_type_id: Some(ids::enterprise_type(1)),
        enterprise_type: None,
        status: Status::Active,
        created_at,
    })
    .collect()
}

pub fn licenses() -> Vec<License> {
    [
        (1, "GP-NET-2024-001", 1, 1, date(2024, 1, 15), date(2029, 1, 14), LicenseStatus::Active),
        (2, "GP-NET-2023-002", 2, 1, date(2023, 6, 20), date(2028, 6, 19), LicenseStatus::Active),
        (3, "GP-SVC-2024-003", 3, 2, date(2024, 3, 10), date(2027, 3, 9), LicenseStatus::Active),
        (4, "GP-NUM-2023-004", 1, 3, date(2023, 1, 1), date(2024, 6, 30), LicenseStatus::Expired),
        (5, "GP-NET-2024-005", 4, 1, date(2024, 8, 5), date(2029, 8, 4), LicenseStatus::Active),
    ]
    .into_iter()
    .map(|(n, number, enterprise, license_type, issue, expiry, status)| License {
        id: ids::license(n),
        license_number: number.to_string(),
        enterprise_id: ids::enterprise(enterprise),
        enterprise: None,
        license_type_id: Some(ids::license_type(license_type)),
        license_type: None,
        issue_date: issue,
        expiry_date: Some(expiry),
        status,
        file_url: None,
        created_at: issue
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_default(),
    })
    .collect()
}

pub fn applications() -> Vec<Application> {
    let admin = "admin@ltra.gov.la";
    vec![
        Application {
            id: ids::application(1),
            code: "HS-2024-001".to_string(),
            enterprise_id: ids::enterprise(1),
            application_type: ApplicationType::New,
            status: ApplicationStatus::Reviewing,
            submission_date: Some(day(2024, 12, 1)),
            created_by: admin.to_string(),
            created_at: day(2024, 12, 1),
            ..Default::default()
        },
        Application {
            id: ids::application(2),
            code: "HS-2024-002".to_string(),
            enterprise_id: ids::enterprise(2),
            license_id: Some(ids::license(2)),
            application_type: ApplicationType::Renew,
            status: ApplicationStatus::Draft,
            created_by: admin.to_string(),
            created_at: day(2024, 12, 10),
            ..Default::default()
        },
        Application {
            id: ids::application(3),
            code: "HS-2024-003".to_string(),
            enterprise_id: ids::enterprise(3),
            license_id: Some(ids::license(3)),
            application_type: ApplicationType::Adjust,
            status: ApplicationStatus::Approved,
            submission_date: Some(day(2024, 11, 15)),
            created_by: admin.to_string(),
            created_at: day(2024, 11, 15),
            ..Default::default()
        },
        Application {
            id: ids::application(4),
            code: "HS-2024-004".to_string(),
            enterprise_id: ids::enterprise(4),
            application_type: ApplicationType::New,
            status: ApplicationStatus::Submitted,
            submission_date: Some(day(2024, 12, 18)),
            created_by: "user@ltra.gov.la".to_string(),
            created_at: day(2024, 12, 18),
            ..Default::default()
        },
    ]
}

pub fn number_ranges() -> Vec<NumberRange> {
    [
        (1, "0209", Some(1), Some(1), ResourceStatus::InUse, day(2024, 1, 15), 72),
        (2, "0205", Some(2), Some(2), ResourceStatus::InUse, day(2023, 6, 20), 58),
        (3, "0207", Some(3), None, ResourceStatus::Assigned, day(2024, 3, 10), 35),
        (4, "0208", Some(4), Some(5), ResourceStatus::InUse, day(2024, 8, 5), 12),
        (5, "0206", None, None, ResourceStatus::Available, day(2024, 1, 1), 0),
    ]
    .into_iter()
    .map(|(n, prefix, telco, license, status, created_at, usage)| {
        // 0209 -> 20900000000 ..= 20909999999
        let base = &prefix[1..];
        NumberRange {
            id: ids::number_range(n),
            prefix: prefix.to_string(),
            start_number: format!("{}00000000", base),
            end_number: format!("{}09999999", base),
            block_size: 10_000_000,
            telco_id: telco.map(ids::enterprise),
            telco: None,
            license_id: license.map(ids::license),
            license: None,
            status,
            created_at,
            usage_percent: Some(usage),
        }
    })
    .collect()
}

pub fn subscribers() -> Vec<Subscriber> {
    vec![
        Subscriber {
            id: ids::subscriber(1),
            msisdn: "02091234567".to_string(),
            serial_number: "SIM-UNI-001234".to_string(),
            telco_id: Some(ids::enterprise(1)),
            range_id: Some(ids::number_range(1)),
            sub_type: SubscriberType::Prepaid,
            activation_status: ActivationStatus::Activated,
            activation_date: Some(date(2024, 6, 15)),
            status: Status::Active,
            last_sync_at: Some(day(2024, 12, 19)),
            ..Default::default()
        },
        Subscriber {
            id: ids::subscriber(2),
            msisdn: "02059876543".to_string(),
            serial_number: "SIM-LTC-005678".to_string(),
            telco_id: Some(ids::enterprise(2)),
            range_id: Some(ids::number_range(2)),
            sub_type: SubscriberType::Postpaid,
            activation_status: ActivationStatus::Activated,
            activation_date: Some(date(2024, 1, 20)),
            status: Status::Active,
            last_sync_at: Some(day(2024, 12, 19)),
            ..Default::default()
        },
        Subscriber {
            id: ids::subscriber(3),
            msisdn: "02075551234".to_string(),
            serial_number: "SIM-ETL-009012".to_string(),
            telco_id: Some(ids::enterprise(3)),
            range_id: Some(ids::number_range(3)),
            sub_type: SubscriberType::Prepaid,
            activation_status: ActivationStatus::NotActivated,
            status: Status::Pending,
            last_sync_at: Some(day(2024, 12, 18)),
            ..Default::default()
        },
    ]
}

pub fn violations() -> Vec<ComplianceViolation> {
    vec![
        ComplianceViolation {
            id: ids::violation(1),
            detection_date: date(2024, 12, 15),
            license_id: Some(ids::license(4)),
            enterprise_id: Some(ids::enterprise(1)),
            violation_type: "License Expired but still active traffic".to_string(),
            description:
                "Phát hiện lưu lượng hoạt động trên giấy phép đã hết hạn GP-NUM-2023-004"
                    .to_string(),
            severity: ViolationSeverity::High,
            status: ViolationStatus::New,
            ..Default::default()
        },
        ComplianceViolation {
            id: ids::violation(2),
            detection_date: date(2024, 12, 10),
            enterprise_id: Some(ids::enterprise(3)),
            violation_type: "Unreported Number Range Usage".to_string(),
            description: "Dải số 0207 được sử dụng nhưng chưa báo cáo đầy đủ".to_string(),
            severity: ViolationSeverity::Medium,
            status: ViolationStatus::Investigating,
            ..Default::default()
        },
    ]
}

pub fn system_logs() -> Vec<SystemLog> {
    [
        (
            1,
            "CREATE_APPLICATION",
            "admin@ltra.gov.la",
            "applications",
            ids::application(1),
            "Created new application HS-2024-001",
            at(2024, 12, 1, 9, 30),
        ),
        (
            2,
            "UPDATE_STATUS",
            "reviewer@ltra.gov.la",
            "applications",
            ids::application(1),
            "Changed status from SUBMITTED to REVIEWING",
            at(2024, 12, 2, 14, 15),
        ),
        (
            3,
            "APPROVE_APPLICATION",
            "director@ltra.gov.la",
            "applications",
            ids::application(3),
            "Approved application HS-2024-003",
            at(2024, 11, 20, 11, 0),
        ),
        (
            4,
            "ALLOCATE_RANGE",
            "admin@ltra.gov.la",
            "number_ranges",
            ids::number_range(4),
            "Allocated range 0208 to TPlus",
            at(2024, 8, 5, 10, 0),
        ),
    ]
    .into_iter()
    .map(
        |(n, action, actor, target_entity, target, details, created_at)| SystemLog {
            id: ids::system_log(n),
            action: action.to_string(),
            actor: actor.to_string(),
            target_entity: target_entity.to_string(),
            target_id: target.to_string(),
            details: details.to_string(),
            created_at,
        },
    )
    .collect()
}

pub fn roles() -> Vec<Role> {
    [
        (1, "Quản trị viên", "admin", "Toàn quyền quản lý hệ thống"),
        (2, "Giám đốc", "director", "Phê duyệt hồ sơ và quyết định"),
        (3, "Chuyên viên thẩm định", "reviewer", "Thẩm định và xem xét hồ sơ"),
        (4, "Nhân viên", "staff", "Nhập liệu và xử lý hồ sơ"),
    ]
    .into_iter()
    .map(|(n, name, code, description)| Role {
        id: ids::role(n),
        name: name.to_string(),
        code: code.to_string(),
        description: description.to_string(),
        status: Status::Active,
        created_at: day(2024, 1, 1),
    })
    .collect()
}

pub fn resources() -> Vec<Resource> {
    [
        (1, "Người dùng", "user", "Quản lý người dùng hệ thống"),
        (2, "Vai trò", "role", "Quản lý vai trò và phân quyền"),
        (3, "Hồ sơ đề nghị", "application", "Quản lý hồ sơ đề nghị cấp phép"),
        (4, "Giấy phép", "license", "Quản lý giấy phép"),
        (5, "Dải số", "number_range", "Quản lý dải số viễn thông"),
        (6, "Thuê bao", "subscriber", "Tra cứu thông tin thuê bao"),
        (7, "Vi phạm", "violation", "Quản lý vi phạm tuân thủ"),
        (8, "Doanh nghiệp", "enterprise", "Quản lý thông tin doanh nghiệp"),
    ]
    .into_iter()
    .map(|(n, name, code, description)| Resource {
        id: ids::resource(n),
        name: name.to_string(),
        code: code.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn role_permissions() -> Vec<RolePermission> {
    use PermissionAction::{Create, Delete, Edit, Read};
    use PermissionScope::{Any, Own};

    let grants: [(u128, &str, PermissionAction, PermissionScope); 27] = [
        // admin
        (1, "user", Read, Any),
        (1, "user", Create, Any),
        (1, "user", Edit, Any),
        (1, "user", Delete, Any),
        (1, "role", Read, Any),
        (1, "role", Create, Any),
        (1, "role", Edit, Any),
        (1, "role", Delete, Any),
        (1, "application", Read, Any),
        (1, "application", Create, Any),
        (1, "application", Edit, Any),
        (1, "application", Delete, Any),
        // director
        (2, "application", Read, Any),
        (2, "application", Edit, Any),
        (2, "license", Read, Any),
        (2, "license", Create, Any),
        (2, "user", Read, Any),
        // reviewer
        (3, "application", Read, Any),
        (3, "application", Edit, Any),
        (3, "license", Read, Any),
        (3, "violation", Read, Any),
        (3, "violation", Create, Any),
        // staff
        (4, "application", Read, Own),
        (4, "application", Create, Own),
        (4, "application", Edit, Own),
        (4, "subscriber", Read, Any),
        (4, "enterprise", Read, Any),
    ];

    grants
        .into_iter()
        .zip(1u128..)
        .map(|((role, resource, action, scope), n)| RolePermission {
            id: ids::role_permission(n),
            role_id: ids::role(role),
            role: None,
            resource: resource.to_string(),
            action,
            scope,
        })
        .collect()
}

pub fn users() -> Vec<User> {
    [
        (1, "admin@ltra.gov.la", "Nguyễn Văn Admin", Status::Active, day(2024, 1, 1)),
        (2, "director@ltra.gov.la", "Trần Thị Giám Đốc", Status::Active, day(2024, 1, 15)),
        (3, "reviewer@ltra.gov.la", "Lê Văn Thẩm Định", Status::Active, day(2024, 2, 1)),
        (4, "staff1@ltra.gov.la", "Phạm Thị Nhân Viên", Status::Active, day(2024, 2, 15)),
        (5, "staff2@ltra.gov.la", "Hoàng Văn Chuyên", Status::Inactive, day(2024, 3, 1)),
    ]
    .into_iter()
    .map(|(n, email, full_name, status, created_at)| User {
        id: ids::user(n),
        email: email.to_string(),
        full_name: full_name.to_string(),
        password_hash: String::new(),
        status,
        created_at,
        roles: None,
    })
    .collect()
}

pub fn user_roles() -> Vec<UserRole> {
    [
        (1, 1, 1, day(2024, 1, 1)),
        (2, 2, 2, day(2024, 1, 15)),
        (3, 3, 3, day(2024, 2, 1)),
        (4, 4, 4, day(2024, 2, 15)),
        (5, 5, 4, day(2024, 3, 1)),
        // admin also holds director
        (6, 1, 2, day(2024, 1, 1)),
    ]
    .into_iter()
    .map(|(n, user, role, created_at)| UserRole {
        id: ids::user_role(n),
        user_id: ids::user(user),
        role_id: ids::role(role),
        user: None,
        role: None,
        created_at,
    })
    .collect()
}
