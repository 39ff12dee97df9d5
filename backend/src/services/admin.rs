//! Admin service: tenant management, platform stats, and configuration
//!
//! Everything here sits behind the admin authorization gate. User creation
//! mirrors self-registration but lets the administrator pick tier, quota,
//! platform allowance, and the admin flag.

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{NewUser, Storage, UpdateUser, UserRecord};
use crate::services::DEFAULT_MODEL_KEY;
use assistant_platform_shared::models::{AssistantConfig, SubscriptionTier};
use assistant_platform_shared::types::{
    AdminCreateUserRequest, AdminStatsResponse, AdminUpdateUserRequest, PlatformConfigResponse,
    UpdatePlatformConfigRequest,
};
use assistant_platform_shared::validation::{
    validate_password, validate_platforms, validate_username, VALID_PLATFORMS,
};
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

/// Admin service
pub struct AdminService;

impl AdminService {
    /// List every user on the platform
    pub async fn list_users(storage: &dyn Storage) -> Result<Vec<UserRecord>, ApiError> {
        storage.list_users().await.map_err(ApiError::Internal)
    }

    /// Create a user with explicit tier/quota/allowance
    pub async fn create_user(
        storage: &dyn Storage,
        req: &AdminCreateUserRequest,
    ) -> Result<UserRecord, ApiError> {
        validate_username(&req.username).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;
        validate_platforms(&req.allowed_platforms).map_err(ApiError::Validation)?;
        if req.max_assistants < 1 {
            return Err(ApiError::Validation(
                "Assistant quota must be at least 1".to_string(),
            ));
        }
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

        let password_hash = PasswordService::hash_async(req.password.clone())
            .await
            .map_err(ApiError::Internal)?;

        let user = storage
            .insert_user(NewUser {
                username: req.username.clone(),
                password_hash,
                company_name: req.company_name.clone(),
                email: req.email.clone(),
                phone: None,
                subscription: req.subscription.as_str().to_string(),
                is_admin: req.is_admin,
                max_assistants: req.max_assistants,
                allowed_platforms: req.allowed_platforms.clone(),
            })
            .await
            .map_err(ApiError::Internal)?;

        info!(username = %user.username, "Admin created user");
        Ok(user)
    }

    /// Update tier, quota, allowance, plan dates, or flags of a user
    pub async fn update_user(
        storage: &dyn Storage,
        id: Uuid,
        req: AdminUpdateUserRequest,
    ) -> Result<UserRecord, ApiError> {
        if let Some(platforms) = &req.allowed_platforms {
            validate_platforms(platforms).map_err(ApiError::Validation)?;
        }
        if let Some(quota) = req.max_assistants {
            if quota < 1 {
                return Err(ApiError::Validation(
                    "Assistant quota must be at least 1".to_string(),
                ));
            }
        }

        let updated = storage
            .update_user(
                id,
                UpdateUser {
                    subscription: req.subscription.map(|t| t.as_str().to_string()),
                    plan_start: req.plan_start,
                    plan_end: req.plan_end,
                    is_admin: req.is_admin,
                    max_assistants: req.max_assistants,
                    allowed_platforms: req.allowed_platforms,
                    is_active: req.is_active,
                    ..Default::default()
                },
            )
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(updated)
    }

    /// Platform-wide counters for the admin dashboard
    pub async fn stats(storage: &dyn Storage) -> Result<AdminStatsResponse, ApiError> {
        Ok(AdminStatsResponse {
            total_users: storage.count_users().await.map_err(ApiError::Internal)?,
            active_users: storage
                .count_active_users()
                .await
                .map_err(ApiError::Internal)?,
            total_assistants: storage
                .count_assistants()
                .await
                .map_err(ApiError::Internal)?,
            total_chats: storage.count_chats().await.map_err(ApiError::Internal)?,
        })
    }

    /// Current platform configuration
    pub async fn get_config(storage: &dyn Storage) -> Result<PlatformConfigResponse, ApiError> {
        let default_model = storage
            .get_config_value(DEFAULT_MODEL_KEY)
            .await
            .map_err(ApiError::Internal)?
            .unwrap_or_else(|| AssistantConfig::default().model);
        Ok(PlatformConfigResponse { default_model })
    }

    /// Update the platform default model
    pub async fn update_config(
        storage: &dyn Storage,
        req: &UpdatePlatformConfigRequest,
    ) -> Result<PlatformConfigResponse, ApiError> {
        if req.default_model.trim().is_empty() {
            return Err(ApiError::Validation(
                "Default model cannot be empty".to_string(),
            ));
        }

        storage
            .set_config_value(DEFAULT_MODEL_KEY, &req.default_model)
            .await
            .map_err(ApiError::Internal)?;

        Ok(PlatformConfigResponse {
            default_model: req.default_model.clone(),
        })
    }

    /// Create the configured administrator account if it does not exist
    ///
    /// Runs at startup; safe to call on every boot.
    pub async fn bootstrap_admin(
        storage: &dyn Storage,
        username: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        if storage
            .find_user_by_username(username)
            .await
            .map_err(ApiError::Internal)?
            .is_some()
        {
            return Ok(());
        }

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        storage
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash,
                company_name: None,
                email: None,
                phone: None,
                subscription: SubscriptionTier::Admin.as_str().to_string(),
                is_admin: true,
                max_assistants: 10,
                allowed_platforms: VALID_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            })
            .await
            .map_err(ApiError::Internal)?;

        info!(username = %username, "Bootstrapped administrator account");
        Ok(())
    }
}
