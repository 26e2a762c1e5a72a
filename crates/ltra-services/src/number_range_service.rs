//! Number range allocation
//!
//! A range is allocated by inserting it with its bounds; the block size is
//! derived from them. Revocation only flips the status to REVOKED.

use crate::audit::{actions, AuditService};
use crate::constants::ALL_ROWS;
use crate::page_params;
use chrono::Utc;
use ltra_cache::{keys, QueryCache};
use ltra_core::{
    models::{number_range, NumberRange, ResourceStatus},
    traits::{EnterpriseRepository, NumberRangeFilter, NumberRangeRepository, Pagination},
    AppError, AppResult,
};
use ltra_db::Store;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const TARGET: &str = "number_ranges";

/// Input for allocating a range
#[derive(Debug, Clone, Default)]
pub struct RangeAllocation {
    pub prefix: String,
    pub start_number: String,
    pub end_number: String,
    pub telco_id: Option<Uuid>,
    pub license_id: Option<Uuid>,
}

/// Counters shown above the number range list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberRangeSummary {
    pub in_use: i64,
    pub available: i64,
    pub estimated_subscribers: i64,
}

pub struct NumberRangeService {
    ranges: Arc<dyn NumberRangeRepository>,
    enterprises: Arc<dyn EnterpriseRepository>,
    audit: AuditService,
    cache: QueryCache,
}

impl NumberRangeService {
    pub fn new(store: &Store, audit: AuditService, cache: QueryCache) -> Self {
        Self {
            ranges: store.number_ranges.clone(),
            enterprises: store.enterprises.clone(),
            audit,
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &NumberRangeFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<NumberRange>, i64)> {
        let fetch = || {
            self.ranges
                .list_filtered(filter, pagination.limit(), pagination.offset())
        };

        let unfiltered =
            filter.search.is_none() && filter.status.is_none() && filter.telco_id.is_none();
        if unfiltered {
            let key = keys::list_key(keys::NUMBER_RANGES, Some(&page_params(pagination)));
            self.cache.get_or_fetch(&key, fetch).await
        } else {
            fetch().await
        }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> AppResult<NumberRangeSummary> {
        let (ranges, _) = self
            .ranges
            .list_filtered(&NumberRangeFilter::default(), ALL_ROWS, 0)
            .await?;

        let count = |status: ResourceStatus| ranges.iter().filter(|r| r.status == status).count();
        Ok(NumberRangeSummary {
            in_use: count(ResourceStatus::InUse) as i64,
            available: count(ResourceStatus::Available) as i64,
            estimated_subscribers: ranges.iter().map(NumberRange::estimated_subscribers).sum(),
        })
    }

    /// Allocate a new range
    ///
    /// The range is ASSIGNED when bound to a telco and AVAILABLE otherwise.
    #[instrument(skip(self, allocation), fields(prefix = %allocation.prefix))]
    pub async fn allocate(
        &self,
        allocation: RangeAllocation,
        actor: &str,
    ) -> AppResult<NumberRange> {
        let prefix = allocation.prefix.trim();
        if prefix.is_empty() {
            return Err(AppError::Validation("prefix must not be empty".to_string()));
        }

        let Some(block_size) =
            number_range::block_size(&allocation.start_number, &allocation.end_number)
        else {
            warn!(
                start = %allocation.start_number,
                end = %allocation.end_number,
                "Rejected range bounds"
            );
            return Err(AppError::Validation(
                "start_number and end_number must be numeric with start <= end".to_string(),
            ));
        };

        if let Some(telco_id) = allocation.telco_id {
            if self.enterprises.find_by_id(telco_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Enterprise {}", telco_id)));
            }
        }

        let status = if allocation.telco_id.is_some() {
            ResourceStatus::Assigned
        } else {
            ResourceStatus::Available
        };

        let row = NumberRange {
            id: Uuid::new_v4(),
            prefix: prefix.to_string(),
            start_number: allocation.start_number.trim().to_string(),
            end_number: allocation.end_number.trim().to_string(),
            block_size,
            telco_id: allocation.telco_id,
            license_id: allocation.license_id,
            status,
            created_at: Utc::now(),
            ..Default::default()
        };
        let created = self.ranges.create(&row).await?;
        info!(id = %created.id, block_size, status = %status, "Number range allocated");

        self.audit
            .record(
                actions::ALLOCATE_RANGE,
                actor,
                TARGET,
                &created.id.to_string(),
                format!(
                    "Allocated {} ({} - {})",
                    created.prefix, created.start_number, created.end_number
                ),
            )
            .await;
        self.cache.invalidate(keys::NUMBER_RANGES).await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn revoke(&self, id: Uuid, actor: &str) -> AppResult<NumberRange> {
        let revoked = self.ranges.update_status(id, ResourceStatus::Revoked).await?;
        info!(prefix = %revoked.prefix, "Number range revoked");

        self.audit
            .record(
                actions::REVOKE_RANGE,
                actor,
                TARGET,
                &id.to_string(),
                format!("Revoked {}", revoked.prefix),
            )
            .await;
        self.cache.invalidate(keys::NUMBER_RANGES).await;
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltra_db::memory::seed::ids;

    fn service(store: &Store) -> NumberRangeService {
        NumberRangeService::new(
            store,
            AuditService::new(store.system_logs.clone()),
            QueryCache::disabled(),
        )
    }

    fn allocation(telco: Option<Uuid>) -> RangeAllocation {
        RangeAllocation {
            prefix: "0203".to_string(),
            start_number: "20300000000".to_string(),
            end_number: "20300999999".to_string(),
            telco_id: telco,
            license_id: None,
        }
    }

    #[tokio::test]
    async fn test_summary_of_seeded_ranges() {
        let summary = service(&Store::seeded()).summary().await.unwrap();

        assert_eq!(summary.in_use, 3);
        assert_eq!(summary.available, 1);
        // 10M blocks at 72%, 58%, 35%, 12% and 0%
        assert_eq!(summary.estimated_subscribers, 17_700_000);
    }

    #[tokio::test]
    async fn test_allocate_to_telco_is_assigned() {
        let store = Store::seeded();
        let created = service(&store)
            .allocate(allocation(Some(ids::enterprise(2))), "staff1@ltra.gov.la")
            .await
            .unwrap();

        assert_eq!(created.block_size, 1_000_000);
        assert_eq!(created.status, ResourceStatus::Assigned);
        assert!(created.telco.is_some());

        let logs = store.system_logs.recent(1).await.unwrap();
        assert_eq!(logs[0].action, actions::ALLOCATE_RANGE);
    }

    #[tokio::test]
    async fn test_allocate_without_telco_is_available() {
        let store = Store::seeded();
        let created = service(&store)
            .allocate(allocation(None), "staff1@ltra.gov.la")
            .await
            .unwrap();
        assert_eq!(created.status, ResourceStatus::Available);
    }

    #[tokio::test]
    async fn test_inverted_bounds_rejected() {
        let store = Store::seeded();
        let err = service(&store)
            .allocate(
                RangeAllocation {
                    start_number: "20399999999".to_string(),
                    ..allocation(None)
                },
                "x",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_signed_bounds_rejected() {
        let store = Store::seeded();
        let before = store.number_ranges.count().await.unwrap();
        let err = service(&store)
            .allocate(
                RangeAllocation {
                    start_number: "-20300000000".to_string(),
                    ..allocation(None)
                },
                "x",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert_eq!(store.number_ranges.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_telco_is_not_found() {
        let store = Store::seeded();
        let err = service(&store)
            .allocate(allocation(Some(Uuid::new_v4())), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_revoke_drops_range_from_market_share() {
        let store = Store::seeded();
        let revoked = service(&store)
            .revoke(ids::number_range(4), "admin@ltra.gov.la")
            .await
            .unwrap();
        assert_eq!(revoked.status, ResourceStatus::Revoked);

        let allocated = store.number_ranges.allocated_by_telco().await.unwrap();
        assert_eq!(allocated.len(), 3);
    }
}
