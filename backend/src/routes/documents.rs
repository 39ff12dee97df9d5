//! Document routes (owner-scoped)

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::services::DocumentService;
use crate::state::AppState;
use assistant_platform_shared::types::{CreateDocumentRequest, DocumentResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

/// Create document routes
pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", delete(remove))
}

/// GET /api/documents
async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<DocumentResponse>>> {
    let documents = DocumentService::list(state.storage.as_ref(), &user).await?;
    Ok(Json(documents))
}

/// POST /api/documents
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    let document = DocumentService::create(state.storage.as_ref(), &user, req).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// DELETE /api/documents/:id
async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    DocumentService::delete(state.storage.as_ref(), &user, id).await?;
    Ok(StatusCode::OK)
}
