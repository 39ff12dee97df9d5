//! Assistant service: owner-scoped persona CRUD
//!
//! Enforces the tenant rules that the schema cannot: the per-plan
//! assistant quota, the platform-subset constraint against the owner's
//! allowance, config parameter ranges, and document ownership for
//! attachments. Cross-tenant reads resolve to NotFound so assistant ids
//! leak nothing.

use crate::error::ApiError;
use crate::repositories::{NewAssistant, Storage, UpdateAssistant, UserRecord};
use assistant_platform_shared::types::{
    AssistantResponse, CreateAssistantRequest, UpdateAssistantRequest,
};
use assistant_platform_shared::validation::{validate_assistant_config, validate_platforms};
use uuid::Uuid;

/// Assistant service
pub struct AssistantService;

impl AssistantService {
    /// Create an assistant for `owner`
    pub async fn create(
        storage: &dyn Storage,
        owner: &UserRecord,
        req: CreateAssistantRequest,
    ) -> Result<AssistantResponse, ApiError> {
        if req.name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }
        if req.personality.trim().is_empty() {
            return Err(ApiError::Validation(
                "Personality cannot be empty".to_string(),
            ));
        }
        validate_platforms(&req.platforms).map_err(ApiError::Validation)?;
        check_platform_allowance(owner, &req.platforms)?;
        validate_assistant_config(&req.config).map_err(ApiError::Validation)?;
        check_owned_documents(storage, owner, &req.document_ids).await?;

        let count = storage
            .count_assistants_for_user(owner.id)
            .await
            .map_err(ApiError::Internal)?;
        if count >= owner.max_assistants as i64 {
            return Err(ApiError::Forbidden(
                "Assistant limit reached for your subscription".to_string(),
            ));
        }

        let record = storage
            .insert_assistant(NewAssistant {
                user_id: owner.id,
                name: req.name,
                personality: req.personality,
                model_type: req.model_type.as_str().to_string(),
                platforms: req.platforms,
                status: req.status.as_str().to_string(),
                config: req.config,
            })
            .await
            .map_err(ApiError::Internal)?;

        if !req.document_ids.is_empty() {
            storage
                .set_assistant_documents(record.id, &req.document_ids)
                .await
                .map_err(ApiError::Internal)?;
        }

        Ok(record.to_response(req.document_ids))
    }

    /// Update an assistant owned by `owner`
    pub async fn update(
        storage: &dyn Storage,
        owner: &UserRecord,
        id: Uuid,
        req: UpdateAssistantRequest,
    ) -> Result<AssistantResponse, ApiError> {
        // Ownership first; a foreign assistant does not exist as far as
        // this tenant can tell
        let existing = storage
            .find_assistant(id)
            .await
            .map_err(ApiError::Internal)?
            .filter(|a| a.user_id == owner.id)
            .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))?;

        if let Some(name) = &req.name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("Name cannot be empty".to_string()));
            }
        }
        if let Some(personality) = &req.personality {
            if personality.trim().is_empty() {
                return Err(ApiError::Validation(
                    "Personality cannot be empty".to_string(),
                ));
            }
        }
        if let Some(platforms) = &req.platforms {
            validate_platforms(platforms).map_err(ApiError::Validation)?;
            check_platform_allowance(owner, platforms)?;
        }
        if let Some(config) = &req.config {
            validate_assistant_config(config).map_err(ApiError::Validation)?;
        }
        if let Some(document_ids) = &req.document_ids {
            check_owned_documents(storage, owner, document_ids).await?;
        }

        let updated = storage
            .update_assistant(
                existing.id,
                UpdateAssistant {
                    name: req.name,
                    personality: req.personality,
                    model_type: req.model_type.map(|m| m.as_str().to_string()),
                    platforms: req.platforms,
                    status: req.status.map(|s| s.as_str().to_string()),
                    config: req.config,
                },
            )
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))?;

        if let Some(document_ids) = req.document_ids {
            storage
                .set_assistant_documents(updated.id, &document_ids)
                .await
                .map_err(ApiError::Internal)?;
        }

        let document_ids = storage
            .assistant_document_ids(updated.id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(updated.to_response(document_ids))
    }

    /// List the owner's assistants
    pub async fn list(
        storage: &dyn Storage,
        owner: &UserRecord,
    ) -> Result<Vec<AssistantResponse>, ApiError> {
        let records = storage
            .list_assistants(owner.id)
            .await
            .map_err(ApiError::Internal)?;

        let mut responses = Vec::with_capacity(records.len());
        for record in records {
            let document_ids = storage
                .assistant_document_ids(record.id)
                .await
                .map_err(ApiError::Internal)?;
            responses.push(record.to_response(document_ids));
        }
        Ok(responses)
    }

    /// Fetch one assistant owned by `owner`
    pub async fn get(
        storage: &dyn Storage,
        owner: &UserRecord,
        id: Uuid,
    ) -> Result<AssistantResponse, ApiError> {
        let record = storage
            .find_assistant(id)
            .await
            .map_err(ApiError::Internal)?
            .filter(|a| a.user_id == owner.id)
            .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))?;

        let document_ids = storage
            .assistant_document_ids(record.id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(record.to_response(document_ids))
    }
}

/// Requested platforms must be a subset of the owner's allowance
fn check_platform_allowance(owner: &UserRecord, platforms: &[String]) -> Result<(), ApiError> {
    for platform in platforms {
        let requested = platform.to_lowercase();
        let allowed = owner
            .allowed_platforms
            .0
            .iter()
            .any(|p| p.to_lowercase() == requested);
        if !allowed {
            return Err(ApiError::Forbidden(format!(
                "Platform '{}' is not enabled for your account",
                platform
            )));
        }
    }
    Ok(())
}

/// Every attached document must exist and belong to the owner
async fn check_owned_documents(
    storage: &dyn Storage,
    owner: &UserRecord,
    document_ids: &[Uuid],
) -> Result<(), ApiError> {
    for id in document_ids {
        let owned = storage
            .find_document(*id)
            .await
            .map_err(ApiError::Internal)?
            .map(|d| d.user_id == owner.id)
            .unwrap_or(false);
        if !owned {
            return Err(ApiError::Validation(format!("Unknown document: {}", id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MemoryStorage, NewUser};
    use assistant_platform_shared::models::{AssistantConfig, AssistantStatus, ModelProvider};

    async fn make_user(storage: &MemoryStorage, max_assistants: i32) -> UserRecord {
        storage
            .insert_user(NewUser {
                username: format!("user-{}", Uuid::new_v4()),
                password_hash: "hash".to_string(),
                company_name: None,
                email: None,
                phone: None,
                subscription: "free".to_string(),
                is_admin: false,
                max_assistants,
                allowed_platforms: vec!["web".to_string()],
            })
            .await
            .unwrap()
    }

    fn create_request(name: &str) -> CreateAssistantRequest {
        CreateAssistantRequest {
            name: name.to_string(),
            personality: "friendly".to_string(),
            model_type: ModelProvider::Deepseek,
            platforms: vec!["web".to_string()],
            status: AssistantStatus::Active,
            config: AssistantConfig::default(),
            document_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_quota_enforced_on_create() {
        let storage = MemoryStorage::new();
        let owner = make_user(&storage, 1).await;

        AssistantService::create(&storage, &owner, create_request("first"))
            .await
            .unwrap();

        let err = AssistantService::create(&storage, &owner, create_request("second"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_platform_must_be_allowed() {
        let storage = MemoryStorage::new();
        let owner = make_user(&storage, 5).await;

        let mut req = create_request("telegram-bot");
        req.platforms = vec!["telegram".to_string()];
        let err = AssistantService::create(&storage, &owner, req)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unknown_platform_is_invalid() {
        let storage = MemoryStorage::new();
        let owner = make_user(&storage, 5).await;

        let mut req = create_request("bad");
        req.platforms = vec!["fax".to_string()];
        let err = AssistantService::create(&storage, &owner, req)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cross_tenant_get_is_not_found() {
        let storage = MemoryStorage::new();
        let owner = make_user(&storage, 5).await;
        let stranger = make_user(&storage, 5).await;

        let created = AssistantService::create(&storage, &owner, create_request("mine"))
            .await
            .unwrap();

        let err = AssistantService::get(&storage, &stranger, created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_temperature() {
        let storage = MemoryStorage::new();
        let owner = make_user(&storage, 5).await;
        let created = AssistantService::create(&storage, &owner, create_request("mine"))
            .await
            .unwrap();

        let mut config = AssistantConfig::default();
        config.temperature = 2.0;
        let err = AssistantService::update(
            &storage,
            &owner,
            created.id,
            UpdateAssistantRequest {
                config: Some(config),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
