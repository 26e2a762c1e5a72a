use ltra_core::{
    models::Subscriber,
    search::{SearchQuery, SEARCH_RESULT_LIMIT},
    traits::{Pagination, SubscriberRepository},
    AppResult,
};
use ltra_db::Store;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Subscriber listing and MSISDN / SIM serial lookup
pub struct SubscriberService {
    subscribers: Arc<dyn SubscriberRepository>,
}

impl SubscriberService {
    pub fn new(store: &Store) -> Self {
        Self {
            subscribers: store.subscribers.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, pagination: &Pagination) -> AppResult<(Vec<Subscriber>, i64)> {
        self.subscribers
            .list(pagination.limit(), pagination.offset())
            .await
    }

    /// Search by MSISDN or SIM serial
    ///
    /// Input outside the accepted alphabet returns no rows instead of an
    /// error.
    #[instrument(skip(self))]
    pub async fn search(&self, raw: &str) -> AppResult<Vec<Subscriber>> {
        let Some(query) = SearchQuery::parse(raw.trim()) else {
            warn!("Rejected subscriber search input");
            return Ok(Vec::new());
        };

        let found = self.subscribers.search(&query, SEARCH_RESULT_LIMIT).await?;
        debug!(count = found.len(), "Subscriber search");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_by_serial() {
        let service = SubscriberService::new(&Store::seeded());
        let found = service.search("SIM-LTC").await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].msisdn, "02059876543");
        assert!(found[0].telco.is_some());
    }

    #[tokio::test]
    async fn test_invalid_input_returns_empty() {
        let service = SubscriberService::new(&Store::seeded());

        assert!(service.search("").await.unwrap().is_empty());
        assert!(service.search("0205%").await.unwrap().is_empty());
        assert!(service
            .search("' OR 1=1 --")
            .await
            .unwrap()
            .is_empty());
        assert!(service.search(&"2".repeat(51)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_paginated() {
        let service = SubscriberService::new(&Store::seeded());
        let (page, total) = service.list(&Pagination::new(1, 2)).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
    }
}
