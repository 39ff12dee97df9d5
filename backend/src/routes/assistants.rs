//! Assistant routes (owner-scoped)

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::services::AssistantService;
use crate::state::AppState;
use assistant_platform_shared::types::{
    AssistantResponse, CreateAssistantRequest, UpdateAssistantRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

/// Create assistant routes
pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(update))
}

/// GET /api/assistants
async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<AssistantResponse>>> {
    let assistants = AssistantService::list(state.storage.as_ref(), &user).await?;
    Ok(Json(assistants))
}

/// POST /api/assistants
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateAssistantRequest>,
) -> ApiResult<(StatusCode, Json<AssistantResponse>)> {
    let assistant = AssistantService::create(state.storage.as_ref(), &user, req).await?;
    Ok((StatusCode::CREATED, Json(assistant)))
}

/// GET /api/assistants/:id
async fn get_one(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AssistantResponse>> {
    let assistant = AssistantService::get(state.storage.as_ref(), &user, id).await?;
    Ok(Json(assistant))
}

/// PATCH /api/assistants/:id
async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssistantRequest>,
) -> ApiResult<Json<AssistantResponse>> {
    let assistant = AssistantService::update(state.storage.as_ref(), &user, id, req).await?;
    Ok(Json(assistant))
}
