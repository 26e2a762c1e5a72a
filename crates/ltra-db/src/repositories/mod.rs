//! PostgreSQL repository implementations
//!
//! Concrete implementations of the repository traits defined in
//! `ltra_core::traits`. Related rows are fetched in the same statement and
//! decoded from `jsonb` columns into the embedded model fields.

pub mod access_repo;
pub mod application_repo;
pub mod catalog_repo;
pub mod enterprise_repo;
pub mod license_repo;
pub mod number_range_repo;
pub mod subscriber_repo;
pub mod system_log_repo;
pub mod violation_repo;

pub use access_repo::PgAccessRepository;
pub use application_repo::PgApplicationRepository;
pub use catalog_repo::PgCatalogRepository;
pub use enterprise_repo::PgEnterpriseRepository;
pub use license_repo::PgLicenseRepository;
pub use number_range_repo::PgNumberRangeRepository;
pub use subscriber_repo::PgSubscriberRepository;
pub use system_log_repo::PgSystemLogRepository;
pub use violation_repo::PgViolationRepository;

use ltra_core::search::contains_pattern;

/// True when a sqlx error is a unique constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// `%escaped%` pattern for an optional list filter; blank terms disable it
pub(crate) fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(contains_pattern)
}

/// Stored strings for a set of enum values, bound as `text[]`
pub(crate) fn status_strings<T: ToString>(statuses: &[T]) -> Vec<String> {
    statuses.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern(Some("0209")), Some("%0209%".to_string()));
        assert_eq!(search_pattern(Some("10%")), Some("%10\\%%".to_string()));
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(None), None);
    }
}
