//! Role, permission and user administration handlers

use super::validate_request;
use crate::dto::{
    ApiResponse, CreateUserRequest, PermissionQuery, PermissionRequest, UpdateUserRequest,
    UserRoleRequest,
};
use actix_web::{web, HttpResponse};
use ltra_auth::{AdminUser, StaffUser};
use ltra_core::AppError;
use ltra_services::constants::{
    PERMISSION_GRANTED, PERMISSION_REVOKED, ROLE_ASSIGNED, ROLE_REMOVED,
};
use ltra_services::Services;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

// ============================================================================
// Roles and permissions
// ============================================================================

/// GET /api/v1/roles
#[instrument(skip(services, _user))]
pub async fn list_roles(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let roles = services.access.roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

/// GET /api/v1/resources
#[instrument(skip(services, _user))]
pub async fn list_resources(
    services: web::Data<Services>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let resources = services.access.resources().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(resources)))
}

/// GET /api/v1/role-permissions?role_id=
#[instrument(skip(services, _user))]
pub async fn list_permissions(
    services: web::Data<Services>,
    query: web::Query<PermissionQuery>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let permissions = services.access.permissions(query.role_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(permissions)))
}

/// POST /api/v1/role-permissions
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn grant_permission(
    services: web::Data<Services>,
    user: AdminUser,
    req: web::Json<PermissionRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Permission")?;

    let permission = services
        .access
        .grant_permission(req.role_id, &req.resource, req.action, req.scope, &user.email)
        .await?;
    info!(resource = %permission.resource, action = %permission.action, "Permission granted");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(permission, PERMISSION_GRANTED)))
}

/// DELETE /api/v1/role-permissions/{id}
#[instrument(skip(services, user), fields(user = %user.email))]
pub async fn revoke_permission(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: AdminUser,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    services.access.revoke_permission(id, &user.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        json!({ "id": id }),
        PERMISSION_REVOKED,
    )))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/v1/users
#[instrument(skip(services, _user))]
pub async fn list_users(
    services: web::Data<Services>,
    _user: AdminUser,
) -> Result<HttpResponse, AppError> {
    let users = services.access.users().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

/// POST /api/v1/users
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn create_user(
    services: web::Data<Services>,
    user: AdminUser,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "User")?;

    let created = services
        .access
        .create_user(req.into_inner().into(), &user.email)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// PUT /api/v1/users/{id}
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn update_user(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    user: AdminUser,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "User")?;

    let updated = services
        .access
        .update_user(path.into_inner(), req.into_inner().into(), &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// GET /api/v1/user-roles
#[instrument(skip(services, _user))]
pub async fn list_user_roles(
    services: web::Data<Services>,
    _user: AdminUser,
) -> Result<HttpResponse, AppError> {
    let links = services.access.user_roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(links)))
}

/// POST /api/v1/user-roles
#[instrument(skip(services, user, req), fields(user = %user.email))]
pub async fn assign_role(
    services: web::Data<Services>,
    user: AdminUser,
    req: web::Json<UserRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let link = services
        .access
        .assign_role(req.user_id, req.role_id, &user.email)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message(link, ROLE_ASSIGNED)))
}

/// DELETE /api/v1/user-roles?user_id=&role_id=
#[instrument(skip(services, user), fields(user = %user.email))]
pub async fn remove_role(
    services: web::Data<Services>,
    query: web::Query<UserRoleRequest>,
    user: AdminUser,
) -> Result<HttpResponse, AppError> {
    services
        .access
        .remove_role(query.user_id, query.role_id, &user.email)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        json!({ "user_id": query.user_id, "role_id": query.role_id }),
        ROLE_REMOVED,
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/roles", web::get().to(list_roles))
        .route("/resources", web::get().to(list_resources))
        .service(
            web::scope("/role-permissions")
                .route("", web::get().to(list_permissions))
                .route("", web::post().to(grant_permission))
                .route("/{id}", web::delete().to(revoke_permission)),
        )
        .service(
            web::scope("/users")
                .route("", web::get().to(list_users))
                .route("", web::post().to(create_user))
                .route("/{id}", web::put().to(update_user)),
        )
        .service(
            web::scope("/user-roles")
                .route("", web::get().to(list_user_roles))
                .route("", web::post().to(assign_role))
                .route("", web::delete().to(remove_role)),
        );
}
