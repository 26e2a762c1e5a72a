//! Actix-web request extractors for authenticated users
//!
//! [`AuthenticatedUser`] accepts any valid token. The role extractors
//! additionally require a minimum console role:
//!
//! | extractor | minimum role |
//! |---|---|
//! | [`StaffUser`] | staff (any assigned role) |
//! | [`ReviewerUser`] | reviewer |
//! | [`AdminUser`] | admin |

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{
    dev::Payload,
    error::{ErrorForbidden, ErrorUnauthorized},
    web, FromRequest, HttpRequest,
};
use futures::future::{ready, Ready};
use ltra_core::error::AppError;
use ltra_core::models::AppRole;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Name of the cookie carrying the token for browser clients
pub const TOKEN_COOKIE: &str = "token";

/// Extract the JWT from the `Authorization: Bearer` header, then the cookie
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string())
}

/// Any signed-in user
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<AppRole>,
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.uid,
            email: claims.sub.clone(),
            role: claims.role,
            claims,
        }
    }

    pub fn has_role(&self, required: AppRole) -> bool {
        self.claims.has_role(required)
    }

    fn authenticate(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
            Some(service) => service.get_ref().clone(),
            None => {
                warn!("JwtService not found in app data");
                return Err(ErrorUnauthorized(AppError::Unauthorized(
                    "Authentication service not configured".to_string(),
                )));
            }
        };

        let Some(token) = extract_token_from_request(req) else {
            debug!("No authentication token found in request");
            return Err(ErrorUnauthorized(AppError::Unauthorized(
                "No authentication token provided".to_string(),
            )));
        };

        match jwt_service.validate_token(&token) {
            Ok(claims) => {
                debug!(
                    email = %claims.sub,
                    role = ?claims.role,
                    "User authenticated successfully"
                );
                Ok(Self::from_claims(claims))
            }
            Err(e) => {
                warn!(error = %e, "Token validation failed");
                Err(ErrorUnauthorized(e))
            }
        }
    }

    /// Authenticate, then require at least `required`
    fn authorize(req: &HttpRequest, required: AppRole) -> Result<Self, actix_web::Error> {
        let user = Self::authenticate(req)?;

        if !user.has_role(required) {
            warn!(
                email = %user.email,
                role = ?user.role,
                required = %required,
                "Access denied: insufficient role"
            );
            return Err(ErrorForbidden(AppError::Forbidden));
        }

        Ok(user)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::authenticate(req))
    }
}

macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthenticatedUser);

        impl std::ops::Deref for $name {
            type Target = AuthenticatedUser;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                ready(AuthenticatedUser::authorize(req, $role).map($name))
            }
        }
    };
}

role_extractor!(
    /// A user holding any console role; required for reads and data entry
    StaffUser,
    AppRole::Staff
);
role_extractor!(
    /// Reviewer, director or admin; required for workflow status changes
    ReviewerUser,
    AppRole::Reviewer
);
role_extractor!(
    /// Admin; required for user and role management
    AdminUser,
    AppRole::Admin
);

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, test, App};

    fn create_test_jwt_service() -> Arc<JwtService> {
        Arc::new(JwtService::new("test-secret-key-12345", 3600))
    }

    fn token_for(jwt: &JwtService, role: Option<AppRole>) -> String {
        jwt.create_token_for_user(Uuid::new_v4(), "user@ltra.gov.la", role)
            .unwrap()
    }

    #[actix_web::test]
    async fn test_extract_token_from_authorization_header() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, Some(AppRole::Staff));

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|user: AuthenticatedUser| async move {
                assert_eq!(user.email, "user@ltra.gov.la");
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_extract_token_from_cookie() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, Some(AppRole::Staff));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/test", web::get().to(|_u: StaffUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .cookie(Cookie::new(TOKEN_COOKIE, token))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_missing_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/test", web::get().to(|_u: AuthenticatedUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get().uri("/test").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_invalid_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/test", web::get().to(|_u: AuthenticatedUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", "Bearer invalid.token.here"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_role_extractors_follow_hierarchy() {
        let jwt_service = create_test_jwt_service();
        let director = token_for(&jwt_service, Some(AppRole::Director));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/review", web::get().to(|_u: ReviewerUser| async { "OK" }))
                .route("/admin", web::get().to(|_u: AdminUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/review")
            .insert_header(("Authorization", format!("Bearer {}", director)))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", director)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);
    }

    #[actix_web::test]
    async fn test_user_without_role_is_not_staff() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, None);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/me", web::get().to(|_u: AuthenticatedUser| async { "OK" }))
                .route("/data", web::get().to(|_u: StaffUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri("/data")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);
    }

    #[actix_web::test]
    async fn test_admin_user_deref() {
        let claims = Claims::new(Uuid::nil(), "admin@ltra.gov.la", Some(AppRole::Admin));
        let admin = AdminUser(AuthenticatedUser::from_claims(claims));

        assert_eq!(admin.email, "admin@ltra.gov.la");
        assert!(admin.has_role(AppRole::Director));
    }
}
