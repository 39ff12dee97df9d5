//! User service: registration, login, and own-profile management
//!
//! This is the authentication gate proper. Registration auto-logs the new
//! user in; login does the credential check inline (lookup, verify,
//! session) and collapses every failure into one indistinguishable 401.

use crate::auth::{PasswordService, SessionRecord, SessionStore};
use crate::error::{invalid_credentials, ApiError};
use crate::repositories::{NewUser, Storage, UpdateUser, UserRecord};
use assistant_platform_shared::models::SubscriptionTier;
use assistant_platform_shared::types::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use assistant_platform_shared::validation::{validate_password, validate_username};
use validator::ValidateEmail;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and immediately establish a session
    pub async fn register(
        storage: &dyn Storage,
        sessions: &dyn SessionStore,
        ttl_secs: i64,
        req: &RegisterRequest,
    ) -> Result<(UserRecord, SessionRecord), ApiError> {
        validate_username(&req.username).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;
        if let Some(email) = &req.email {
            if !email.validate_email() {
                return Err(ApiError::Validation("Invalid email format".to_string()));
            }
        }

        if storage
            .find_user_by_username(&req.username)
            .await
            .map_err(ApiError::Internal)?
            .is_some()
        {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        // Hash on the blocking pool; argon2 is deliberately slow
        let password_hash = PasswordService::hash_async(req.password.clone())
            .await
            .map_err(ApiError::Internal)?;

        let user = storage
            .insert_user(NewUser {
                username: req.username.clone(),
                password_hash,
                company_name: req.company_name.clone(),
                email: req.email.clone(),
                phone: req.phone.clone(),
                subscription: SubscriptionTier::Free.as_str().to_string(),
                is_admin: false,
                max_assistants: 1,
                allowed_platforms: vec!["web".to_string()],
            })
            .await
            .map_err(ApiError::Internal)?;

        let session = sessions
            .create(user.id, ttl_secs)
            .await
            .map_err(ApiError::Internal)?;

        Ok((user, session))
    }

    /// Login with username and password
    ///
    /// Unknown username, deactivated account, and wrong password all
    /// produce the same rejection.
    pub async fn login(
        storage: &dyn Storage,
        sessions: &dyn SessionStore,
        ttl_secs: i64,
        req: &LoginRequest,
    ) -> Result<(UserRecord, SessionRecord), ApiError> {
        let user = storage
            .find_user_by_username(&req.username)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(invalid_credentials)?;

        if !user.is_active {
            return Err(invalid_credentials());
        }

        let valid =
            PasswordService::verify_async(req.password.clone(), user.password_hash.clone()).await;
        if !valid {
            return Err(invalid_credentials());
        }

        let session = sessions
            .create(user.id, ttl_secs)
            .await
            .map_err(ApiError::Internal)?;

        Ok((user, session))
    }

    /// Destroy a session; unknown tokens are silently ignored
    pub async fn logout(sessions: &dyn SessionStore, token: Option<&str>) -> Result<(), ApiError> {
        if let Some(token) = token {
            sessions.delete(token).await.map_err(ApiError::Internal)?;
        }
        Ok(())
    }

    /// Update the caller's own profile fields
    pub async fn update_profile(
        storage: &dyn Storage,
        user: &UserRecord,
        req: UpdateProfileRequest,
    ) -> Result<UserRecord, ApiError> {
        if let Some(email) = &req.email {
            if !email.validate_email() {
                return Err(ApiError::Validation("Invalid email format".to_string()));
            }
        }

        let updated = storage
            .update_user(
                user.id,
                UpdateUser {
                    company_name: req.company_name,
                    email: req.email,
                    phone: req.phone,
                    instagram: req.instagram,
                    telegram: req.telegram,
                    payment_method: req.payment_method,
                    ..Default::default()
                },
            )
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(updated)
    }
}
