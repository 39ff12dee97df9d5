//! API request and response types
//!
//! The JSON wire format uses camelCase field names, matching what the
//! browser client sends and expects.

use crate::models::{AssistantConfig, AssistantStatus, ModelProvider, SubscriptionTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Authentication
// ============================================================================

/// Registration request
///
/// Only username and password are required; the remaining profile fields
/// are optional and can be filled in later from the settings page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Sanitized user representation returned to clients
///
/// The stored credential hash never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub subscription: SubscriptionTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_end: Option<String>,
    pub is_admin: bool,
    pub max_assistants: i32,
    pub allowed_platforms: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Own-profile update request (settings page)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

// ============================================================================
// Assistants
// ============================================================================

/// Create assistant request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    pub name: String,
    pub personality: String,
    #[serde(default)]
    pub model_type: ModelProvider,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub status: AssistantStatus,
    #[serde(default)]
    pub config: AssistantConfig,
    #[serde(default)]
    pub document_ids: Vec<Uuid>,
}

fn default_platforms() -> Vec<String> {
    vec!["web".to_string()]
}

/// Partial assistant update request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssistantRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssistantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AssistantConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ids: Option<Vec<Uuid>>,
}

/// Assistant representation returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub personality: String,
    pub model_type: ModelProvider,
    pub platforms: Vec<String>,
    pub status: AssistantStatus,
    pub config: AssistantConfig,
    pub document_ids: Vec<Uuid>,
}

// ============================================================================
// Documents
// ============================================================================

/// Create document request
///
/// `content` is the already-extracted text; binary formats are converted
/// upstream before upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub name: String,
    pub content: String,
    pub doc_type: String,
}

/// Document representation returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub doc_type: String,
}

// ============================================================================
// Chat
// ============================================================================

/// Chat message request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub assistant_id: Uuid,
    pub message: String,
}

/// Chat reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

// ============================================================================
// Admin
// ============================================================================

/// Admin user-creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub subscription: SubscriptionTier,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_max_assistants")]
    pub max_assistants: i32,
    #[serde(default = "default_allowed_platforms")]
    pub allowed_platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn default_max_assistants() -> i32 {
    1
}

fn default_allowed_platforms() -> Vec<String> {
    vec!["web".to_string()]
}

/// Admin user-update request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_assistants: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_platforms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_end: Option<String>,
}

/// Platform-wide statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub total_assistants: i64,
    pub total_chats: i64,
}

/// Platform configuration update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlatformConfigRequest {
    pub default_model: String,
}

/// Platform configuration representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfigResponse {
    pub default_model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_uses_camel_case() {
        let user = UserResponse {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            company_name: None,
            email: None,
            phone: None,
            instagram: None,
            telegram: None,
            payment_method: None,
            subscription: SubscriptionTier::Free,
            plan_start: None,
            plan_end: None,
            is_admin: false,
            max_assistants: 1,
            allowed_platforms: vec!["web".to_string()],
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["maxAssistants"], 1);
        // Optional empty fields are omitted entirely
        assert!(json.get("companyName").is_none());
    }

    #[test]
    fn test_register_request_minimal_body() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"pw1"}"#).unwrap();
        assert_eq!(req.username, "alice");
        assert!(req.email.is_none());
    }

    #[test]
    fn test_create_assistant_defaults() {
        let req: CreateAssistantRequest =
            serde_json::from_str(r#"{"name":"Sales","personality":"friendly"}"#).unwrap();
        assert_eq!(req.model_type, ModelProvider::Deepseek);
        assert_eq!(req.platforms, vec!["web".to_string()]);
        assert_eq!(req.status, AssistantStatus::Active);
        assert_eq!(req.config, AssistantConfig::default());
        assert!(req.document_ids.is_empty());
    }
}
