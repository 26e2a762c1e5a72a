//! Cache key constants and builders
//!
//! Keys follow the console's query keys: an entity prefix, the query kind,
//! then optional parameters.
//!
//! # Key Patterns
//!
//! - `applications:list[:{params}]` - Application list pages
//! - `number_ranges:list[:{params}]` - Number range list pages
//! - `licenses:list[:{params}]` - License list pages
//! - `dashboard:stats` - Dashboard counters
//!
//! # Example
//!
//! ```
//! use ltra_cache::keys;
//!
//! assert_eq!(keys::list_key(keys::APPLICATIONS, None), "applications:list");
//! assert_eq!(keys::DASHBOARD_STATS, "dashboard:stats");
//! ```

/// Prefix for application queries
pub const APPLICATIONS: &str = "applications";

/// Prefix for number range queries
pub const NUMBER_RANGES: &str = "number_ranges";

/// Prefix for license queries
pub const LICENSES: &str = "licenses";

/// Prefix for violation queries; only invalidated, since violation
/// changes move the dashboard counters
pub const VIOLATIONS: &str = "violations";

/// Prefix for enterprise queries; enterprises are not cached themselves but
/// are embedded in other entities' rows
pub const ENTERPRISES: &str = "enterprises";

/// Prefix for dashboard queries
pub const DASHBOARD: &str = "dashboard";

/// Dashboard counters
pub const DASHBOARD_STATS: &str = "dashboard:stats";

/// Build a list key for an entity, optionally narrowed by query parameters
///
/// ```
/// use ltra_cache::keys::{list_key, NUMBER_RANGES};
///
/// assert_eq!(
///     list_key(NUMBER_RANGES, Some("page=1:per_page=50")),
///     "number_ranges:list:page=1:per_page=50"
/// );
/// ```
pub fn list_key(entity: &str, params: Option<&str>) -> String {
    match params {
        Some(params) if !params.is_empty() => format!("{}:list:{}", entity, params),
        _ => format!("{}:list", entity),
    }
}

/// Build a pattern for matching all keys with a given prefix
///
/// ```
/// use ltra_cache::keys::pattern;
///
/// assert_eq!(pattern("licenses"), "licenses:*");
/// ```
pub fn pattern(prefix: &str) -> String {
    format!("{}:*", prefix)
}

/// Cached entities whose rows embed a row of `entity`
pub fn embedding(entity: &str) -> &'static [&'static str] {
    match entity {
        ENTERPRISES => &[APPLICATIONS, LICENSES, NUMBER_RANGES, VIOLATIONS],
        LICENSES => &[APPLICATIONS, NUMBER_RANGES, VIOLATIONS],
        _ => &[],
    }
}

/// Patterns to drop after a mutation on `entity`: its own queries, the
/// queries embedding it and the dashboard, whose counters depend on every
/// entity
pub fn invalidation_patterns(entity: &str) -> Vec<String> {
    let mut patterns = vec![pattern(entity)];
    patterns.extend(embedding(entity).iter().map(|e| pattern(e)));
    if entity != DASHBOARD {
        patterns.push(pattern(DASHBOARD));
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_key() {
        assert_eq!(list_key(APPLICATIONS, None), "applications:list");
        assert_eq!(list_key(LICENSES, Some("")), "licenses:list");
        assert_eq!(
            list_key(LICENSES, Some("page=2")),
            "licenses:list:page=2"
        );
    }

    #[test]
    fn test_invalidation_covers_dashboard() {
        assert_eq!(
            invalidation_patterns(APPLICATIONS),
            vec!["applications:*".to_string(), "dashboard:*".to_string()]
        );
        assert_eq!(invalidation_patterns(DASHBOARD), vec!["dashboard:*"]);
    }

    #[test]
    fn test_enterprise_change_drops_embedding_lists() {
        assert_eq!(
            invalidation_patterns(ENTERPRISES),
            vec![
                "enterprises:*",
                "applications:*",
                "licenses:*",
                "number_ranges:*",
                "violations:*",
                "dashboard:*",
            ]
        );
    }

    #[test]
    fn test_license_change_drops_embedding_lists() {
        let patterns = invalidation_patterns(LICENSES);
        assert!(patterns.contains(&pattern(APPLICATIONS)));
        assert!(patterns.contains(&pattern(NUMBER_RANGES)));
        assert!(patterns.contains(&pattern(VIOLATIONS)));
        assert!(!patterns.contains(&pattern(ENTERPRISES)));
    }

    #[test]
    fn test_list_key_matches_its_pattern_prefix() {
        let key = list_key(NUMBER_RANGES, Some("status=IN_USE"));
        let pattern = pattern(NUMBER_RANGES);
        assert!(key.starts_with(pattern.trim_end_matches('*')));
    }
}
