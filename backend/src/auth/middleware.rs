//! Authentication and authorization extractors
//!
//! `CurrentUser` is the authentication gate: it resolves the session
//! cookie to a user on every request that asks for it, rejecting with the
//! uniform 401 otherwise. `AdminUser` layers the authorization gate on
//! top: authentication is checked first, so an unauthenticated caller of
//! an admin route sees 401, an authenticated non-admin sees 403.

use crate::error::{unauthenticated, ApiError};
use crate::repositories::UserRecord;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};

use super::session::token_from_cookie_header;

/// The authenticated user resolved from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| {
                token_from_cookie_header(header, &app_state.config.session.cookie_name)
            })
            .ok_or_else(unauthenticated)?;

        let session = app_state
            .sessions
            .get(&token)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(unauthenticated)?;

        let user = app_state
            .storage
            .find_user_by_id(session.user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(unauthenticated)?;

        // A deactivated account is indistinguishable from no account
        if !user.is_active {
            return Err(unauthenticated());
        }

        Ok(CurrentUser(user))
    }
}

/// An authenticated user that also holds the admin flag
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserRecord);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Authentication first: 401 wins over 403
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(ApiError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }

        Ok(AdminUser(user))
    }
}
