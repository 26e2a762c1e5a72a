//! HTTP-level tests against the seeded memory store
//!
//! Every test builds the full `/api/v1` app over a fresh demo dataset with
//! caching disabled.

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use ltra_api::{configure, health};
    use ltra_auth::{JwtService, PasswordService};
    use ltra_cache::QueryCache;
    use ltra_core::models::AppRole;
    use ltra_db::memory::seed::ids;
    use ltra_db::{MemoryStore, Store};
    use ltra_services::Services;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    macro_rules! app {
        ($store:expr) => {{
            let jwt = Arc::new(JwtService::new(SECRET, 3600));
            let services = Services::new(&$store, QueryCache::disabled(), jwt.clone());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(services))
                    .app_data(web::Data::new(jwt))
                    .route("/health", web::get().to(health))
                    .service(web::scope("/api/v1").configure(configure)),
            )
            .await
        }};
        () => {
            app!(Store::seeded())
        };
    }

    fn bearer(user: Uuid, email: &str, role: AppRole) -> (&'static str, String) {
        let token = JwtService::new(SECRET, 3600)
            .create_token_for_user(user, email, Some(role))
            .unwrap();
        ("Authorization", format!("Bearer {}", token))
    }

    fn staff() -> (&'static str, String) {
        bearer(ids::user(4), "staff1@ltra.gov.la", AppRole::Staff)
    }

    fn reviewer() -> (&'static str, String) {
        bearer(ids::user(3), "reviewer@ltra.gov.la", AppRole::Reviewer)
    }

    fn admin() -> (&'static str, String) {
        bearer(ids::user(1), "admin@ltra.gov.la", AppRole::Admin)
    }

    #[actix_rt::test]
    async fn test_health() {
        let app = app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_rt::test]
    async fn test_protected_route_requires_token() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard/stats")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_dashboard_stats_match_dataset() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard/stats")
            .insert_header(staff())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["total_active_licenses"], 4);
        assert_eq!(body["data"]["total_number_ranges"], 5);
        assert_eq!(body["data"]["pending_applications"], 2);
        assert_eq!(body["data"]["new_violations"], 1);
    }

    #[actix_rt::test]
    async fn test_create_application_without_enterprise_is_rejected() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/applications")
            .insert_header(staff())
            .set_json(json!({ "type": "NEW" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "missing_field");
    }

    #[actix_rt::test]
    async fn test_create_application_returns_created_message() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/applications")
            .insert_header(staff())
            .set_json(json!({
                "code": "HS-TEST-100",
                "enterprise_id": ids::enterprise(2),
                "type": "RENEW",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "DRAFT");
        assert_eq!(body["message"], "Hồ sơ HS-TEST-100 đã được tạo");
    }

    #[actix_rt::test]
    async fn test_status_change_needs_reviewer() {
        let app = app!();
        let uri = format!("/api/v1/applications/{}/status", ids::application(2));

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(staff())
            .set_json(json!({ "status": "SUBMITTED" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(reviewer())
            .set_json(json!({ "status": "SUBMITTED" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "SUBMITTED");
        assert!(!body["data"]["submission_date"].is_null());
        assert_eq!(body["message"], "Hồ sơ HS-2024-002 đã chuyển sang \"Đã nộp\"");
    }

    #[actix_rt::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/applications?status=bogus")
            .insert_header(staff())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_board_holds_every_application_once() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/applications/board")
            .insert_header(staff())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let columns = body["data"].as_array().unwrap();
        assert_eq!(columns.len(), 5);
        let total: u64 = columns.iter().map(|c| c["count"].as_u64().unwrap()).sum();
        assert_eq!(total, 4);
    }

    #[actix_rt::test]
    async fn test_list_is_paginated() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/enterprises?page=1&per_page=2")
            .insert_header(staff())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["total"], 4);
        assert_eq!(body["pagination"]["total_pages"], 2);
    }

    #[actix_rt::test]
    async fn test_duplicate_role_assignment_conflicts() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/user-roles")
            .insert_header(admin())
            .set_json(json!({ "user_id": ids::user(4), "role_id": ids::role(4) }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Người dùng đã có vai trò này");
    }

    #[actix_rt::test]
    async fn test_role_management_needs_admin() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(reviewer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_upload_checks_extension() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/uploads?file_name=report.pdf")
            .insert_header(staff())
            .set_payload("%PDF-1.4")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_input");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .ends_with("Định dạng file không hợp lệ"));

        let req = test::TestRequest::post()
            .uri("/api/v1/uploads?file_name=usage.CSV")
            .insert_header(staff())
            .set_payload("msisdn,bytes\n02055512345,1024\n\n02059876543,2048\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["rows"], 2);
    }

    #[actix_rt::test]
    async fn test_subscriber_search() {
        let app = app!();

        let req = test::TestRequest::get()
            .uri("/api/v1/subscribers/search?q=02059876543")
            .insert_header(staff())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // "20%" is not a plausible identifier
        let req = test::TestRequest::get()
            .uri("/api/v1/subscribers/search?q=20%25")
            .insert_header(staff())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_login_sets_cookie_and_rejects_inactive_user() {
        let memory = Arc::new(MemoryStore::seeded());
        let hash = PasswordService::new().hash_password("ltra-demo-2024").unwrap();
        memory.set_missing_password_hashes(&hash);
        let app = app!(Store::memory(memory));

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "staff1@ltra.gov.la", "password": "ltra-demo-2024" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .response()
            .cookies()
            .any(|c| c.name() == "token" && !c.value().is_empty()));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["role"], "staff");
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert!(body["data"]["user"].get("password_hash").is_none());

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "staff2@ltra.gov.la", "password": "ltra-demo-2024" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "staff1@ltra.gov.la", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
