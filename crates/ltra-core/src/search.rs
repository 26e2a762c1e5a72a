//! Search input sanitisation
//!
//! Free text typed into the console ends up inside `ILIKE` patterns.
//! The subscriber lookup only accepts a restricted alphabet; list page
//! filters accept any text but have their wildcards escaped.

use serde::Serialize;

/// Maximum accepted length of a subscriber search term
pub const MAX_SEARCH_LEN: usize = 50;

/// Maximum number of rows a subscriber search returns
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// True when `query` is non-empty, at most 50 characters long and made
/// only of ASCII letters, digits, `.`, `_`, `-` and spaces.
pub fn is_valid_search_query(query: &str) -> bool {
    !query.is_empty()
        && query.chars().count() <= MAX_SEARCH_LEN
        && query
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
}

/// Escape LIKE wildcards so the text matches literally.
///
/// The escape character itself is handled first so that the escapes
/// added for `%` and `_` are not doubled.
///
/// ```
/// use ltra_core::search::sanitize_like_pattern;
///
/// assert_eq!(sanitize_like_pattern("50%_off"), "50\\%\\_off");
/// assert_eq!(sanitize_like_pattern("a\\b"), "a\\\\b");
/// ```
pub fn sanitize_like_pattern(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring pattern for `ILIKE ... ESCAPE '\'`
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", sanitize_like_pattern(input))
}

/// A validated subscriber search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    term: String,
    pattern: String,
}

impl SearchQuery {
    /// Validate and escape raw input. Returns `None` for invalid input.
    pub fn parse(raw: &str) -> Option<Self> {
        if !is_valid_search_query(raw) {
            return None;
        }
        Some(Self {
            term: raw.to_string(),
            pattern: contains_pattern(raw),
        })
    }

    /// The original term, for in-memory matching
    pub fn term(&self) -> &str {
        &self.term
    }

    /// `%escaped%` pattern for SQL
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
