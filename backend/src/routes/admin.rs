//! Admin routes
//!
//! Every handler takes the `AdminUser` extractor: unauthenticated callers
//! get 401 before the admin flag is ever consulted, authenticated
//! non-admins get 403.

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::services::AdminService;
use crate::state::AppState;
use assistant_platform_shared::types::{
    AdminCreateUserRequest, AdminStatsResponse, AdminUpdateUserRequest, PlatformConfigResponse,
    UpdatePlatformConfigRequest, UserResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", axum::routing::post(update_user))
        .route("/stats", get(stats))
        .route("/config", get(get_config).post(update_config))
}

/// GET /api/admin/users
async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = AdminService::list_users(state.storage.as_ref()).await?;
    Ok(Json(users.iter().map(|u| u.to_response()).collect()))
}

/// POST /api/admin/users
async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<AdminCreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = AdminService::create_user(state.storage.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(user.to_response())))
}

/// POST /api/admin/users/:id
async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = AdminService::update_user(state.storage.as_ref(), id, req).await?;
    Ok(Json(user.to_response()))
}

/// GET /api/admin/stats
async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<AdminStatsResponse>> {
    let stats = AdminService::stats(state.storage.as_ref()).await?;
    Ok(Json(stats))
}

/// GET /api/admin/config
async fn get_config(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<PlatformConfigResponse>> {
    let config = AdminService::get_config(state.storage.as_ref()).await?;
    Ok(Json(config))
}

/// POST /api/admin/config
async fn update_config(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<UpdatePlatformConfigRequest>,
) -> ApiResult<Json<PlatformConfigResponse>> {
    let config = AdminService::update_config(state.storage.as_ref(), &req).await?;
    Ok(Json(config))
}
