//! Chat route

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::services::ChatService;
use crate::state::AppState;
use assistant_platform_shared::types::{ChatRequest, ChatResponse};
use axum::{extract::State, Json};

/// POST /api/chat - send a message to one of the caller's assistants
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let response = ChatService::send(state.storage.as_ref(), &state.llm, &user, &req).await?;
    Ok(Json(response))
}
