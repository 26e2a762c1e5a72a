//! Envelope and pagination types shared by every endpoint

use ltra_core::traits::{PaginatedResponse, Pagination, PaginationMeta};
use ltra_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    /// Toast text for the console
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters
///
/// Values arrive as strings when the struct is flattened into a filter
/// query, so both numbers and numeric strings are accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page", deserialize_with = "deserialize_number_from_string")]
    #[validate(range(min = 1))]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page", deserialize_with = "deserialize_number_from_string")]
    #[validate(range(min = 1, max = 1000))]
    pub per_page: i64,
}

fn deserialize_number_from_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct I64OrStringVisitor;

    impl<'de> Visitor<'de> for I64OrStringVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<i64, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<i64, E>
        where
            E: de::Error,
        {
            i64::try_from(value).map_err(de::Error::custom)
        }

        fn visit_str<E>(self, value: &str) -> Result<i64, E>
        where
            E: de::Error,
        {
            value.trim().parse::<i64>().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(I64OrStringVisitor)
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Repository pagination, with out-of-range values clamped
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn metadata(&self, total: i64) -> PaginationMeta {
        let p = self.pagination();
        PaginationMeta::new(total, p.page, p.per_page)
    }

    pub fn paginate<T>(&self, data: Vec<T>, total: i64) -> PaginatedResponse<T> {
        PaginatedResponse {
            data,
            pagination: self.metadata(total),
        }
    }
}

/// Parse an optional status-like query value; blank means "no filter"
pub fn parse_optional<T>(value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some),
    }
}

/// Blank search text means "no filter"
pub fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_core::models::ApplicationStatus;

    #[test]
    fn test_pagination_params_clamp() {
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.pagination().offset(), 40);

        let meta = PaginationParams {
            page: 1,
            per_page: 5000,
        }
        .metadata(10);
        assert_eq!(meta.per_page, 1000);
    }

    #[test]
    fn test_pagination_params_from_strings() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": "2", "per_page": "25"}"#).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 25);

        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 50);
    }

    #[test]
    fn test_parse_optional_status() {
        assert_eq!(
            parse_optional::<ApplicationStatus>(Some("reviewing")).unwrap(),
            Some(ApplicationStatus::Reviewing)
        );
        assert_eq!(parse_optional::<ApplicationStatus>(Some(" ")).unwrap(), None);
        assert!(parse_optional::<ApplicationStatus>(Some("LOST")).is_err());
    }

    #[test]
    fn test_api_response() {
        let resp = ApiResponse::success("test");
        assert!(resp.message.is_none());

        let resp = ApiResponse::with_message("data", "Đã gán vai trò thành công");
        assert_eq!(resp.message.as_deref(), Some("Đã gán vai trò thành công"));
    }
}
