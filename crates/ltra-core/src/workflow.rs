//! Application review workflow
//!
//! The board shows one column per [`ApplicationStatus`]. Any card may be
//! moved to any column; moving into SUBMITTED stamps the submission date
//! when the caller does not supply one.

use crate::models::{Application, ApplicationStatus};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// Board column order
pub const BOARD_COLUMNS: [ApplicationStatus; 5] = [
    ApplicationStatus::Draft,
    ApplicationStatus::Submitted,
    ApplicationStatus::Reviewing,
    ApplicationStatus::Approved,
    ApplicationStatus::Rejected,
];

impl ApplicationStatus {
    /// Vietnamese column label
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "Nháp",
            ApplicationStatus::Submitted => "Đã nộp",
            ApplicationStatus::Reviewing => "Đang xem xét",
            ApplicationStatus::Approved => "Đã duyệt",
            ApplicationStatus::Rejected => "Từ chối",
        }
    }

    /// Counted as pending on the dashboard
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Submitted | ApplicationStatus::Reviewing
        )
    }
}

/// Statuses counted as pending applications
pub const PENDING_STATUSES: [ApplicationStatus; 2] =
    [ApplicationStatus::Submitted, ApplicationStatus::Reviewing];

/// Submission date to write for a status change.
///
/// `None` means "keep whatever is stored".
pub fn submission_date_for(
    status: ApplicationStatus,
    supplied: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match supplied {
        Some(date) => Some(date),
        None if status == ApplicationStatus::Submitted => Some(now),
        None => None,
    }
}

/// Toast text shown after a successful status change
pub fn status_changed_message(code: &str, status: ApplicationStatus) -> String {
    format!("Hồ sơ {} đã chuyển sang \"{}\"", code, status.label())
}

/// Toast text shown after an application is created
pub fn created_message(code: &str) -> String {
    format!("Hồ sơ {} đã được tạo", code)
}

/// Audit detail for a status change
pub fn status_change_details(from: ApplicationStatus, to: ApplicationStatus) -> String {
    format!("Changed status from {} to {}", from, to)
}

/// Generated application code, `HS-<year>-<NNN>`
pub fn generate_code(now: DateTime<Utc>, sequence: i64) -> String {
    format!("HS-{}-{:03}", now.year(), sequence)
}

/// One column of the review board
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub count: usize,
    pub applications: Vec<Application>,
}

/// Group applications into the five board columns.
///
/// Every application lands in exactly one column; columns are sorted by
/// `created_at` descending.
pub fn group_into_columns(applications: Vec<Application>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = BOARD_COLUMNS
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            label: status.label(),
            count: 0,
            applications: Vec::new(),
        })
        .collect();

    for app in applications {
        if let Some(column) = columns.iter_mut().find(|c| c.status == app.status) {
            column.applications.push(app);
        }
    }

    for column in &mut columns {
        column
            .applications
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        column.count = column.applications.len();
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, 8, 0, 0).unwrap()
    }

    fn app(n: u128, status: ApplicationStatus, day: u32) -> Application {
        Application {
            id: Uuid::from_u128(n),
            code: format!("HS-2024-{:03}", n),
            status,
            created_at: at(day),
            ..Default::default()
        }
    }

    #[test]
    fn test_submitted_without_date_is_stamped() {
        let now = at(20);
        assert_eq!(
            submission_date_for(ApplicationStatus::Submitted, None, now),
            Some(now)
        );
    }

    #[test]
    fn test_supplied_date_is_kept() {
        let supplied = at(1);
        assert_eq!(
            submission_date_for(ApplicationStatus::Submitted, Some(supplied), at(20)),
            Some(supplied)
        );
        assert_eq!(
            submission_date_for(ApplicationStatus::Approved, Some(supplied), at(20)),
            Some(supplied)
        );
    }

    #[test]
    fn test_other_statuses_leave_date_untouched() {
        for status in [
            ApplicationStatus::Draft,
            ApplicationStatus::Reviewing,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(submission_date_for(status, None, at(20)), None);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            status_changed_message("HS-2024-001", ApplicationStatus::Approved),
            "Hồ sơ HS-2024-001 đã chuyển sang \"Đã duyệt\""
        );
        assert_eq!(created_message("HS-2024-005"), "Hồ sơ HS-2024-005 đã được tạo");
        assert_eq!(
            status_change_details(ApplicationStatus::Draft, ApplicationStatus::Submitted),
            "Changed status from DRAFT to SUBMITTED"
        );
    }

    #[test]
    fn test_generate_code() {
        assert_eq!(generate_code(at(3), 7), "HS-2024-007");
        assert_eq!(generate_code(at(3), 1234), "HS-2024-1234");
    }

    #[test]
    fn test_board_keeps_every_application_once() {
        let apps = vec![
            app(1, ApplicationStatus::Reviewing, 1),
            app(2, ApplicationStatus::Draft, 2),
            app(3, ApplicationStatus::Reviewing, 5),
            app(4, ApplicationStatus::Approved, 3),
            app(5, ApplicationStatus::Submitted, 4),
        ];

        let columns = group_into_columns(apps);
        assert_eq!(columns.len(), 5);

        let total: usize = columns.iter().map(|c| c.count).sum();
        assert_eq!(total, 5);

        let mut ids: Vec<Uuid> = columns
            .iter()
            .flat_map(|c| c.applications.iter().map(|a| a.id))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);

        let reviewing = &columns[2];
        assert_eq!(reviewing.status, ApplicationStatus::Reviewing);
        assert_eq!(reviewing.label, "Đang xem xét");
        assert_eq!(reviewing.applications[0].id, Uuid::from_u128(3));
        assert!(columns[4].applications.is_empty());
    }

    #[test]
    fn test_pending_statuses() {
        assert!(ApplicationStatus::Submitted.is_pending());
        assert!(ApplicationStatus::Reviewing.is_pending());
        assert!(!ApplicationStatus::Draft.is_pending());
    }
}
