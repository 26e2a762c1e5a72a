//! Domain models for the LTRA console
//!
//! Entities mirror the regulator's relational schema. Related rows
//! (an application's enterprise, a range's telco, ...) are embedded as
//! optional fields and populated by list/detail queries.

/// Declares an enum persisted as a fixed string.
///
/// Generates serde renames, `Display`, `FromStr` (case-insensitive),
/// `as_str`, `ALL` and `from_db`, which falls back to the default
/// variant for unknown values coming from storage.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored string form
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            /// Parse a stored value, falling back to the default variant
            pub fn from_db(s: &str) -> Self {
                s.parse().unwrap_or_else(|_| {
                    ::tracing::warn!(
                        value = s,
                        "Unknown {} value in storage, using default",
                        stringify!($name)
                    );
                    Self::default()
                })
            }
        }

        impl $crate::models::StoredEnum for $name {
            fn from_db(s: &str) -> Self {
                $name::from_db(s)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::AppError::InvalidInput(format!(
                    "invalid {} '{}'",
                    stringify!($name),
                    s
                )))
            }
        }
    };
}

/// Enum columns read back from storage
pub trait StoredEnum: Sized {
    /// Parse a stored value, falling back to the default variant
    fn from_db(s: &str) -> Self;
}

/// Deserialize a stored enum field without failing on unknown values.
///
/// Used on entity fields so rows embedded as JSON by joins decode the same
/// way as plain columns. Request bodies keep the strict `Deserialize`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: ::serde::Deserializer<'de>,
    T: StoredEnum,
{
    let value = <String as ::serde::Deserialize>::deserialize(deserializer)?;
    Ok(T::from_db(&value))
}

pub mod access;
pub mod application;
pub mod catalog;
pub mod dashboard;
pub mod enterprise;
pub mod license;
pub mod number_range;
pub mod status;
pub mod subscriber;
pub mod system_log;
pub mod violation;

pub use access::{
    AppRole, PermissionAction, PermissionScope, Resource, Role, RolePermission, User, UserRole,
};
pub use application::{Application, ApplicationStatus, ApplicationType, NewApplication};
pub use catalog::{
    EnterpriseType, LicenseCategory, LicenseType, ResourceType, ServiceGroup, ServiceType,
};
pub use dashboard::{ChartData, DashboardOverview, DashboardStats};
pub use enterprise::Enterprise;
pub use license::{License, LicenseStatus};
pub use number_range::{NumberRange, ResourceStatus};
pub use status::Status;
pub use subscriber::{ActivationStatus, Subscriber, SubscriberType};
pub use system_log::{NewSystemLog, SystemLog};
pub use violation::{ComplianceViolation, ViolationSeverity, ViolationStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_nested_status_falls_back_to_default() {
        let value = json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "license_number": "GP-001",
            "status": "SUSPENDED_PENDING_REVIEW",
            "enterprise": {
                "id": "00000000-0000-0000-0000-000000000002",
                "name": "Lao Telecom",
                "status": "archived"
            }
        });
        let license: License = serde_json::from_value(value).unwrap();

        assert_eq!(license.status, LicenseStatus::default());
        assert_eq!(license.enterprise.unwrap().status, Status::default());
    }

    #[test]
    fn test_known_stored_values_are_case_insensitive() {
        let enterprise: Enterprise =
            serde_json::from_value(json!({ "status": "inactive" })).unwrap();
        assert_eq!(enterprise.status, Status::Inactive);
    }

    #[test]
    fn test_bare_enum_stays_strict() {
        assert!(serde_json::from_value::<ApplicationStatus>(json!("LOST")).is_err());
    }
}
