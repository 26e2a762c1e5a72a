//! Dashboard counters and charts

use crate::constants::{RECENT_APPLICATIONS, RECENT_VIOLATIONS};
use ltra_cache::{keys, QueryCache};
use ltra_core::{
    models::{ChartData, DashboardOverview, DashboardStats, LicenseStatus, ViolationStatus},
    traits::{
        ApplicationFilter, ApplicationRepository, LicenseRepository, NumberRangeRepository,
        ViolationFilter, ViolationRepository,
    },
    workflow::PENDING_STATUSES,
    AppResult,
};
use ltra_db::Store;
use std::sync::Arc;
use tracing::{debug, instrument};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub struct DashboardService {
    licenses: Arc<dyn LicenseRepository>,
    number_ranges: Arc<dyn NumberRangeRepository>,
    applications: Arc<dyn ApplicationRepository>,
    violations: Arc<dyn ViolationRepository>,
    cache: QueryCache,
}

impl DashboardService {
    pub fn new(store: &Store, cache: QueryCache) -> Self {
        Self {
            licenses: store.licenses.clone(),
            number_ranges: store.number_ranges.clone(),
            applications: store.applications.clone(),
            violations: store.violations.clone(),
            cache,
        }
    }

    /// The four headline counters, served through the query cache
    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        self.cache
            .get_or_fetch(keys::DASHBOARD_STATS, || self.count_stats())
            .await
    }

    async fn count_stats(&self) -> AppResult<DashboardStats> {
        let (total_active_licenses, total_number_ranges, pending_applications, new_violations) =
            tokio::try_join!(
                self.licenses.count_by_status(&[LicenseStatus::Active]),
                self.number_ranges.count(),
                self.applications.count_by_status(&PENDING_STATUSES),
                self.violations.count_by_status(&[ViolationStatus::New]),
            )?;

        let stats = DashboardStats {
            total_active_licenses,
            total_number_ranges,
            pending_applications,
            new_violations,
        };
        debug!(?stats, "Dashboard counters computed");
        Ok(stats)
    }

    /// Licenses issued per month of `year`, one point per month
    #[instrument(skip(self))]
    pub async fn licenses_per_month(&self, year: i32) -> AppResult<Vec<ChartData>> {
        let counts = self.licenses.count_issued_by_month(year).await?;
        Ok(monthly_points(&counts))
    }

    /// Share of allocated numbering capacity per telco, largest first
    #[instrument(skip(self))]
    pub async fn market_share(&self) -> AppResult<Vec<ChartData>> {
        let allocated = self.number_ranges.allocated_by_telco().await?;
        Ok(share_points(&allocated))
    }

    /// Counters plus the latest applications and violations
    #[instrument(skip(self))]
    pub async fn overview(&self) -> AppResult<DashboardOverview> {
        let app_filter = ApplicationFilter::default();
        let violation_filter = ViolationFilter::default();

        let (stats, (recent_applications, _), (recent_violations, _)) = tokio::try_join!(
            self.stats(),
            self.applications
                .list_filtered(&app_filter, RECENT_APPLICATIONS, 0),
            self.violations
                .list_filtered(&violation_filter, RECENT_VIOLATIONS, 0),
        )?;

        Ok(DashboardOverview {
            stats,
            recent_applications,
            recent_violations,
        })
    }
}

fn monthly_points(counts: &[(u32, i64)]) -> Vec<ChartData> {
    MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, month)| {
            let value = counts
                .iter()
                .find(|(m, _)| *m == month)
                .map_or(0, |(_, n)| *n);
            ChartData::new(*name, value)
        })
        .collect()
}

/// Short chart label: "Unitel (Star Telecom)" becomes "Unitel"
fn short_name(name: &str) -> &str {
    name.split(" (").next().unwrap_or(name).trim()
}

fn share_points(allocated: &[(String, i64)]) -> Vec<ChartData> {
    let total: i64 = allocated.iter().map(|(_, size)| size).sum();
    if total <= 0 {
        return Vec::new();
    }

    let mut points: Vec<ChartData> = allocated
        .iter()
        .map(|(name, size)| {
            let percent = (*size as f64 * 100.0 / total as f64).round() as i64;
            ChartData::new(short_name(name), percent)
        })
        .collect();
    points.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_core::models::ApplicationStatus;
    use ltra_db::memory::seed::ids;

    fn service(store: &Store) -> DashboardService {
        DashboardService::new(store, QueryCache::disabled())
    }

    #[tokio::test]
    async fn test_stats_match_seeded_rows() {
        let stats = service(&Store::seeded()).stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_active_licenses: 4,
                total_number_ranges: 5,
                pending_applications: 2,
                new_violations: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_stats_follow_status_changes() {
        let store = Store::seeded();
        ApplicationRepository::update_status(
            store.applications.as_ref(),
            ids::application(2),
            ApplicationStatus::Submitted,
            None,
        )
        .await
        .unwrap();

        let stats = service(&store).stats().await.unwrap();
        assert_eq!(stats.pending_applications, 3);
    }

    #[tokio::test]
    async fn test_licenses_per_month_has_twelve_points() {
        let points = service(&Store::seeded())
            .licenses_per_month(2024)
            .await
            .unwrap();

        assert_eq!(points.len(), 12);
        assert_eq!(points[0], ChartData::new("Jan", 1));
        assert_eq!(points[1], ChartData::new("Feb", 0));
        assert_eq!(points[2], ChartData::new("Mar", 1));
        assert_eq!(points[7], ChartData::new("Aug", 1));
        assert_eq!(points.iter().map(|p| p.value).sum::<i64>(), 3);
    }

    #[tokio::test]
    async fn test_market_share_of_seeded_ranges() {
        let points = service(&Store::seeded()).market_share().await.unwrap();

        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ETL", "LTC", "TPlus", "Unitel"]);
        assert!(points.iter().all(|p| p.value == 25));
    }

    #[tokio::test]
    async fn test_overview_limits_recent_lists() {
        let overview = service(&Store::seeded()).overview().await.unwrap();

        assert_eq!(overview.recent_applications.len(), 4);
        assert_eq!(overview.recent_applications[0].code, "HS-2024-004");
        assert_eq!(overview.recent_violations.len(), 2);
        assert_eq!(overview.stats.new_violations, 1);
    }

    #[test]
    fn test_share_points_rounding() {
        let points = share_points(&[
            ("A (Alpha)".to_string(), 2),
            ("B".to_string(), 1),
        ]);
        assert_eq!(points, vec![ChartData::new("A", 67), ChartData::new("B", 33)]);
        assert!(share_points(&[]).is_empty());
    }
}
