//! Authentication routes
//!
//! Registration, login, and logout. Register and login both answer with
//! the sanitized user and a Set-Cookie header carrying the fresh session
//! token; logout clears it. Password work happens on the blocking pool
//! inside the service layer.

use crate::auth::{build_session_cookie, clear_session_cookie, token_from_cookie_header};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use assistant_platform_shared::types::{LoginRequest, RegisterRequest};
use axum::{
    extract::State,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// POST /api/register - create an account and log it in
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user, session) = UserService::register(
        state.storage.as_ref(),
        state.sessions.as_ref(),
        state.session_ttl(),
        &req,
    )
    .await?;

    let cookie = build_session_cookie(
        &state.config.session.cookie_name,
        &session.token,
        state.session_ttl(),
        state.config.session.secure(),
    );

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(user.to_response()),
    ))
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user, session) = UserService::login(
        state.storage.as_ref(),
        state.sessions.as_ref(),
        state.session_ttl(),
        &req,
    )
    .await?;

    let cookie = build_session_cookie(
        &state.config.session.cookie_name,
        &session.token,
        state.session_ttl(),
        state.config.session.secure(),
    );

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(user.to_response())))
}

/// POST /api/logout - destroy the current session; idempotent
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| token_from_cookie_header(header, &state.config.session.cookie_name));

    UserService::logout(state.sessions.as_ref(), token.as_deref()).await?;

    let cookie = clear_session_cookie(
        &state.config.session.cookie_name,
        state.config.session.secure(),
    );

    Ok((StatusCode::OK, AppendHeaders([(SET_COOKIE, cookie)])))
}
