//! Current-user routes
//!
//! `GET /api/user` is the session probe the browser client calls on every
//! page load; an unauthenticated caller sees the uniform 401.

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use assistant_platform_shared::types::{UpdateProfileRequest, UserResponse};
use axum::{extract::State, Json};

/// GET /api/user - the user behind the current session
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.to_response())
}

/// PATCH /api/user - update own profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let updated = UserService::update_profile(state.storage.as_ref(), &user, req).await?;
    Ok(Json(updated.to_response()))
}
