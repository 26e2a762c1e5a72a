//! Usage-data upload check
//!
//! Telcos upload subscriber usage exports as CSV or Excel files. The
//! console accepts the file by extension; CSV bodies also report how many
//! data rows they carry.

use crate::audit::{actions, AuditService};
use crate::constants::{INVALID_FILE_FORMAT, UPLOAD_ACCEPTED};
use ltra_core::{AppError, AppResult};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl UploadFormat {
    /// Format from the file name's extension, ignoring case
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.trim().to_lowercase();
        if lower.ends_with(".csv") {
            Some(UploadFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(UploadFormat::Xlsx)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub file_name: String,
    pub format: UploadFormat,
    pub size_bytes: usize,
    /// Data rows after the header; only counted for CSV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    pub message: &'static str,
}

pub struct UploadService {
    audit: AuditService,
}

impl UploadService {
    pub fn new(audit: AuditService) -> Self {
        Self { audit }
    }

    #[instrument(skip(self, body), fields(size = body.len()))]
    pub async fn check(&self, file_name: &str, body: &[u8], actor: &str) -> AppResult<UploadReport> {
        let Some(format) = UploadFormat::from_file_name(file_name) else {
            warn!(file_name, "Rejected upload with unsupported extension");
            return Err(AppError::InvalidInput(INVALID_FILE_FORMAT.to_string()));
        };

        let rows = match format {
            UploadFormat::Csv => Some(count_csv_rows(body)),
            UploadFormat::Xlsx => None,
        };
        info!(file_name, ?format, rows, "Upload accepted");

        let details = match rows {
            Some(n) => format!("Uploaded {} ({} rows)", file_name, n),
            None => format!("Uploaded {}", file_name),
        };
        self.audit
            .record(actions::UPLOAD_DATA, actor, "uploads", file_name, details)
            .await;

        Ok(UploadReport {
            file_name: file_name.to_string(),
            format,
            size_bytes: body.len(),
            rows,
            message: UPLOAD_ACCEPTED,
        })
    }
}

/// Non-blank lines after the first non-blank (header) line
fn count_csv_rows(body: &[u8]) -> usize {
    String::from_utf8_lossy(body)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_db::MemoryStore;
    use std::sync::Arc;

    fn service() -> UploadService {
        UploadService::new(AuditService::new(Arc::new(MemoryStore::seeded())))
    }

    #[test]
    fn test_extension_check_ignores_case() {
        assert_eq!(UploadFormat::from_file_name("usage.CSV"), Some(UploadFormat::Csv));
        assert_eq!(UploadFormat::from_file_name("Usage.Xlsx"), Some(UploadFormat::Xlsx));
        assert_eq!(UploadFormat::from_file_name("usage.xls"), None);
        assert_eq!(UploadFormat::from_file_name("usage.csv.exe"), None);
        assert_eq!(UploadFormat::from_file_name("csv"), None);
    }

    #[test]
    fn test_count_csv_rows() {
        assert_eq!(count_csv_rows(b"msisdn,usage\r\n02091234567,12\r\n\r\n02059876543,3\n"), 2);
        assert_eq!(count_csv_rows(b"msisdn,usage\n"), 0);
        assert_eq!(count_csv_rows(b""), 0);
    }

    #[tokio::test]
    async fn test_rejected_extension_message() {
        let err = service()
            .check("usage.pdf", b"%PDF", "staff1@ltra.gov.la")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("Định dạng file không hợp lệ"));
    }

    #[tokio::test]
    async fn test_accepted_csv_reports_rows() {
        let report = service()
            .check("usage.csv", b"msisdn\n02091234567\n02059876543\n", "staff1@ltra.gov.la")
            .await
            .unwrap();

        assert_eq!(report.format, UploadFormat::Csv);
        assert_eq!(report.rows, Some(2));
        assert_eq!(report.message, "Đã xử lý thành công");
    }

    #[tokio::test]
    async fn test_xlsx_is_not_counted() {
        let report = service()
            .check("usage.xlsx", &[0x50, 0x4b, 0x03, 0x04], "x")
            .await
            .unwrap();
        assert_eq!(report.rows, None);
        assert_eq!(report.size_bytes, 4);
    }
}
