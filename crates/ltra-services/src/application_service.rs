//! Application intake and review workflow

use crate::audit::{actions, AuditService};
use crate::constants::{ALL_ROWS, CODE_ATTEMPTS, MAX_CODE_LEN};
use crate::page_params;
use chrono::{DateTime, Utc};
use ltra_cache::{keys, QueryCache};
use ltra_core::{
    models::{Application, ApplicationStatus, NewApplication},
    traits::{ApplicationFilter, ApplicationRepository, Pagination},
    workflow::{self, BoardColumn},
    AppError, AppResult,
};
use ltra_db::Store;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const TARGET: &str = "applications";

pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    audit: AuditService,
    cache: QueryCache,
}

impl ApplicationService {
    pub fn new(store: &Store, audit: AuditService, cache: QueryCache) -> Self {
        Self {
            applications: store.applications.clone(),
            audit,
            cache,
        }
    }

    /// One page of applications, newest first
    ///
    /// Unfiltered pages are served through the query cache.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ApplicationFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Application>, i64)> {
        let fetch = || {
            self.applications
                .list_filtered(filter, pagination.limit(), pagination.offset())
        };

        if filter.search.is_none() && filter.status.is_none() {
            let key = keys::list_key(keys::APPLICATIONS, Some(&page_params(pagination)));
            self.cache.get_or_fetch(&key, fetch).await
        } else {
            fetch().await
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<Application> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {}", id)))
    }

    /// Create an application from client input
    ///
    /// `enterprise_id` and `type` are checked before anything touches
    /// storage. A missing code is generated as `HS-<year>-<NNN>`.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewApplication, actor: &str) -> AppResult<Application> {
        let enterprise_id = input
            .enterprise_id
            .ok_or_else(|| AppError::MissingField("enterprise_id".to_string()))?;
        let application_type = input
            .application_type
            .ok_or_else(|| AppError::MissingField("type".to_string()))?;

        let now = Utc::now();
        let explicit_code = match input.code.as_deref().map(str::trim) {
            Some("") => return Err(AppError::Validation("code must not be empty".to_string())),
            Some(code) if code.chars().count() > MAX_CODE_LEN => {
                return Err(AppError::Validation(format!(
                    "code must be at most {} characters",
                    MAX_CODE_LEN
                )))
            }
            Some(code) => Some(code.to_string()),
            None => None,
        };

        let status = input.status.unwrap_or_default();
        let mut application = Application {
            id: Uuid::new_v4(),
            enterprise_id,
            license_id: input.license_id,
            application_type,
            status,
            workflow_step_id: input.workflow_step_id,
            submission_date: workflow::submission_date_for(status, input.submission_date, now),
            created_by: input
                .created_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| actor.to_string()),
            created_at: now,
            ..Default::default()
        };

        let created = match explicit_code {
            Some(code) => {
                application.code = code;
                self.applications.create(&application).await?
            }
            None => self.create_with_generated_code(&mut application, now).await?,
        };
        info!(code = %created.code, status = %created.status, "Application created");

        self.audit
            .record(
                actions::CREATE_APPLICATION,
                actor,
                TARGET,
                &created.id.to_string(),
                format!("Created new application {}", created.code),
            )
            .await;
        self.cache.invalidate(keys::APPLICATIONS).await;

        Ok(created)
    }

    /// Insert with the next free `HS-<year>-<NNN>` code
    ///
    /// Starts after the current row count and moves to the next sequence
    /// whenever the code is already taken.
    async fn create_with_generated_code(
        &self,
        application: &mut Application,
        now: DateTime<Utc>,
    ) -> AppResult<Application> {
        let start = self.applications.count().await? + 1;

        for sequence in start..start + CODE_ATTEMPTS {
            application.code = workflow::generate_code(now, sequence);
            match self.applications.create(application).await {
                Err(AppError::AlreadyExists(_)) => {
                    debug!(code = %application.code, "Generated code taken, trying next");
                }
                result => return result,
            }
        }

        warn!(start, "No free application code found");
        Err(AppError::Conflict(format!(
            "No free application code after {} attempts",
            CODE_ATTEMPTS
        )))
    }

    /// Move an application to `status`
    ///
    /// Any transition is accepted. Without a supplied date, moving into
    /// SUBMITTED stamps the current time and other moves keep the stored
    /// submission date.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        submission_date: Option<DateTime<Utc>>,
        actor: &str,
    ) -> AppResult<Application> {
        let current = self.get(id).await?;
        let date = workflow::submission_date_for(status, submission_date, Utc::now());

        let updated = self.applications.update_status(id, status, date).await?;
        info!(
            code = %updated.code,
            from = %current.status,
            to = %updated.status,
            "Application status changed"
        );

        self.audit
            .record(
                actions::UPDATE_STATUS,
                actor,
                TARGET,
                &id.to_string(),
                workflow::status_change_details(current.status, status),
            )
            .await;
        self.cache.invalidate(keys::APPLICATIONS).await;

        Ok(updated)
    }

    /// Drop a board card onto the `destination` column
    #[instrument(skip(self))]
    pub async fn move_card(
        &self,
        id: Uuid,
        destination: ApplicationStatus,
        actor: &str,
    ) -> AppResult<Application> {
        let current = self.get(id).await?;
        if current.status == destination {
            debug!(code = %current.code, "Card dropped on its own column");
            return Ok(current);
        }
        self.update_status(id, destination, None, actor).await
    }

    /// All applications grouped into the five board columns
    #[instrument(skip(self))]
    pub async fn board(&self) -> AppResult<Vec<BoardColumn>> {
        let (applications, _) = self
            .applications
            .list_filtered(&ApplicationFilter::default(), ALL_ROWS, 0)
            .await?;
        Ok(workflow::group_into_columns(applications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ltra_db::memory::seed::ids;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service(store: &Store) -> ApplicationService {
        ApplicationService::new(
            store,
            AuditService::new(store.system_logs.clone()),
            QueryCache::disabled(),
        )
    }

    fn new_application() -> NewApplication {
        NewApplication {
            enterprise_id: Some(ids::enterprise(1)),
            application_type: Some(ltra_core::models::ApplicationType::New),
            ..Default::default()
        }
    }

    /// Counts every storage call and fails them all
    #[derive(Default)]
    struct CountingApplications {
        calls: AtomicUsize,
    }

    impl CountingApplications {
        fn hit<T>(&self) -> AppResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Database("not expected".to_string()))
        }
    }

    #[async_trait]
    impl ltra_core::traits::Repository<Application, Uuid> for CountingApplications {
        async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<Application>> {
            self.hit()
        }
        async fn find_all(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Application>> {
            self.hit()
        }
        async fn count(&self) -> AppResult<i64> {
            self.hit()
        }
        async fn create(&self, _entity: &Application) -> AppResult<Application> {
            self.hit()
        }
        async fn update(&self, _entity: &Application) -> AppResult<Application> {
            self.hit()
        }
    }

    #[async_trait]
    impl ApplicationRepository for CountingApplications {
        async fn list_filtered(
            &self,
            _filter: &ApplicationFilter,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<(Vec<Application>, i64)> {
            self.hit()
        }
        async fn count_by_status(&self, _statuses: &[ApplicationStatus]) -> AppResult<i64> {
            self.hit()
        }
        async fn update_status(
            &self,
            _id: Uuid,
            _status: ApplicationStatus,
            _submission_date: Option<DateTime<Utc>>,
        ) -> AppResult<Application> {
            self.hit()
        }
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_before_storage() {
        let repo = Arc::new(CountingApplications::default());
        let mut store = Store::seeded();
        let applications: Arc<dyn ApplicationRepository> = repo.clone();
        store.applications = applications;
        let service = service(&store);

        let no_enterprise = NewApplication {
            enterprise_id: None,
            ..new_application()
        };
        let err = service.create(no_enterprise, "a@ltra.gov.la").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField(ref f) if f == "enterprise_id"));

        let no_type = NewApplication {
            application_type: None,
            ..new_application()
        };
        let err = service.create(no_type, "a@ltra.gov.la").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField(ref f) if f == "type"));

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let store = Store::seeded();
        let service = service(&store);

        let created = service
            .create(new_application(), "staff1@ltra.gov.la")
            .await
            .unwrap();

        assert_eq!(created.status, ApplicationStatus::Draft);
        assert_eq!(created.created_by, "staff1@ltra.gov.la");
        assert!(created.submission_date.is_none());
        assert!(created.code.starts_with("HS-"));
        assert!(created.code.ends_with("-005"));
        assert!(created.enterprise.is_some());

        let logs = store.system_logs.recent(1).await.unwrap();
        assert_eq!(logs[0].action, actions::CREATE_APPLICATION);
    }

    #[tokio::test]
    async fn test_generated_code_skips_taken_sequence() {
        let store = Store::seeded();
        let service = service(&store);
        let year = Utc::now().format("%Y").to_string();
        let taken = format!("HS-{}-006", year);

        service
            .create(
                NewApplication {
                    code: Some(taken.clone()),
                    ..new_application()
                },
                "staff1@ltra.gov.la",
            )
            .await
            .unwrap();

        let generated = service
            .create(new_application(), "staff1@ltra.gov.la")
            .await
            .unwrap();
        assert_eq!(generated.code, format!("HS-{}-007", year));

        let next = service
            .create(new_application(), "staff1@ltra.gov.la")
            .await
            .unwrap();
        assert_eq!(next.code, format!("HS-{}-008", year));
    }

    #[tokio::test]
    async fn test_create_submitted_stamps_date() {
        let store = Store::seeded();
        let service = service(&store);

        let created = service
            .create(
                NewApplication {
                    code: Some("HS-TEST-1".to_string()),
                    status: Some(ApplicationStatus::Submitted),
                    ..new_application()
                },
                "staff1@ltra.gov.la",
            )
            .await
            .unwrap();

        assert_eq!(created.code, "HS-TEST-1");
        assert!(created.submission_date.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_code() {
        let store = Store::seeded();
        let err = service(&store)
            .create(
                NewApplication {
                    code: Some("   ".to_string()),
                    ..new_application()
                },
                "a@ltra.gov.la",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_submitting_stamps_date_when_none_supplied() {
        let store = Store::seeded();
        let service = service(&store);

        // HS-2024-002 is a DRAFT without a submission date
        let before = Utc::now();
        let updated = service
            .update_status(
                ids::application(2),
                ApplicationStatus::Submitted,
                None,
                "reviewer@ltra.gov.la",
            )
            .await
            .unwrap();

        let stamped = updated.submission_date.unwrap();
        assert!(stamped >= before);

        let logs = store.system_logs.recent(1).await.unwrap();
        assert_eq!(logs[0].details, "Changed status from DRAFT to SUBMITTED");
    }

    #[tokio::test]
    async fn test_supplied_date_wins() {
        let store = Store::seeded();
        let supplied = Utc::now() - chrono::Duration::days(3);

        let updated = service(&store)
            .update_status(
                ids::application(2),
                ApplicationStatus::Submitted,
                Some(supplied),
                "reviewer@ltra.gov.la",
            )
            .await
            .unwrap();

        assert_eq!(updated.submission_date, Some(supplied));
    }

    #[tokio::test]
    async fn test_any_transition_is_allowed() {
        let store = Store::seeded();
        let service = service(&store);

        // APPROVED back to DRAFT
        let updated = service
            .update_status(ids::application(3), ApplicationStatus::Draft, None, "x")
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Draft);
        assert!(updated.submission_date.is_some());
    }

    #[tokio::test]
    async fn test_unknown_application_is_not_found() {
        let store = Store::seeded();
        let err = service(&store)
            .update_status(Uuid::new_v4(), ApplicationStatus::Approved, None, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_move_card_to_same_column_is_noop() {
        let store = Store::seeded();
        let service = service(&store);

        let moved = service
            .move_card(ids::application(1), ApplicationStatus::Reviewing, "x")
            .await
            .unwrap();
        assert_eq!(moved.status, ApplicationStatus::Reviewing);

        // no UPDATE_STATUS entry was written
        let logs = store.system_logs.recent(100).await.unwrap();
        assert_eq!(logs.len(), 4);
    }

    #[tokio::test]
    async fn test_board_holds_every_application_once() {
        let store = Store::seeded();
        let board = service(&store).board().await.unwrap();

        assert_eq!(board.len(), 5);
        assert_eq!(board.iter().map(|c| c.count).sum::<usize>(), 4);
        let draft = &board[0];
        assert_eq!(draft.status, ApplicationStatus::Draft);
        assert_eq!(draft.applications[0].code, "HS-2024-002");
    }
}
