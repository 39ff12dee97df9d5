//! Data access layer
//!
//! `Storage` is the injected directory boundary: route handlers and
//! services only ever see this trait, never a pool or a map. Two
//! implementations exist, [`PgStorage`] for production and
//! [`MemoryStorage`] for local development and tests, selected once at
//! process startup.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use anyhow::Result;
use assistant_platform_shared::models::AssistantConfig;
use assistant_platform_shared::types::{AssistantResponse, DocumentResponse, UserResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

/// User record as persisted
///
/// Carries the credential hash; convert with [`UserRecord::to_response`]
/// before anything leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub telegram: Option<String>,
    pub payment_method: Option<String>,
    pub subscription: String,
    pub plan_start: Option<String>,
    pub plan_end: Option<String>,
    pub is_admin: bool,
    pub max_assistants: i32,
    pub allowed_platforms: Json<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Sanitized client representation; the hash never crosses this line.
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            company_name: self.company_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            instagram: self.instagram.clone(),
            telegram: self.telegram.clone(),
            payment_method: self.payment_method.clone(),
            subscription: self.subscription.parse().unwrap_or_default(),
            plan_start: self.plan_start.clone(),
            plan_end: self.plan_end.clone(),
            is_admin: self.is_admin,
            max_assistants: self.max_assistants,
            allowed_platforms: self.allowed_platforms.0.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subscription: String,
    pub is_admin: bool,
    pub max_assistants: i32,
    pub allowed_platforms: Vec<String>,
}

/// Partial user update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub telegram: Option<String>,
    pub payment_method: Option<String>,
    pub subscription: Option<String>,
    pub plan_start: Option<String>,
    pub plan_end: Option<String>,
    pub is_admin: Option<bool>,
    pub max_assistants: Option<i32>,
    pub allowed_platforms: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Assistant record as persisted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssistantRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub personality: String,
    pub model_type: String,
    pub platforms: Json<Vec<String>>,
    pub status: String,
    pub config: Json<AssistantConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssistantRecord {
    pub fn to_response(&self, document_ids: Vec<Uuid>) -> AssistantResponse {
        AssistantResponse {
            id: self.id,
            user_id: self.user_id,
            name: self.name.clone(),
            personality: self.personality.clone(),
            model_type: self.model_type.parse().unwrap_or_default(),
            platforms: self.platforms.0.clone(),
            status: self.status.parse().unwrap_or_default(),
            config: self.config.0.clone(),
            document_ids,
        }
    }
}

/// Input for creating an assistant
#[derive(Debug, Clone)]
pub struct NewAssistant {
    pub user_id: Uuid,
    pub name: String,
    pub personality: String,
    pub model_type: String,
    pub platforms: Vec<String>,
    pub status: String,
    pub config: AssistantConfig,
}

/// Partial assistant update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateAssistant {
    pub name: Option<String>,
    pub personality: Option<String>,
    pub model_type: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub status: Option<String>,
    pub config: Option<AssistantConfig>,
}

/// Document record as persisted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub content: String,
    pub doc_type: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn to_response(&self) -> DocumentResponse {
        DocumentResponse {
            id: self.id,
            name: self.name.clone(),
            content: self.content.clone(),
            doc_type: self.doc_type.clone(),
        }
    }
}

/// Input for creating a document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub name: String,
    pub content: String,
    pub doc_type: String,
}

/// Input for appending to the chat log
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub assistant_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub content: String,
}

/// Injected storage boundary (user directory, tenant data, platform config)
#[async_trait]
pub trait Storage: Send + Sync {
    // User directory
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord>;
    async fn update_user(&self, id: Uuid, updates: UpdateUser) -> Result<Option<UserRecord>>;
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    // Assistants
    async fn find_assistant(&self, id: Uuid) -> Result<Option<AssistantRecord>>;
    async fn list_assistants(&self, user_id: Uuid) -> Result<Vec<AssistantRecord>>;
    async fn count_assistants_for_user(&self, user_id: Uuid) -> Result<i64>;
    async fn insert_assistant(&self, assistant: NewAssistant) -> Result<AssistantRecord>;
    async fn update_assistant(
        &self,
        id: Uuid,
        updates: UpdateAssistant,
    ) -> Result<Option<AssistantRecord>>;
    async fn assistant_document_ids(&self, assistant_id: Uuid) -> Result<Vec<Uuid>>;
    async fn set_assistant_documents(
        &self,
        assistant_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<()>;
    async fn documents_for_assistant(&self, assistant_id: Uuid) -> Result<Vec<DocumentRecord>>;

    // Documents
    async fn find_document(&self, id: Uuid) -> Result<Option<DocumentRecord>>;
    async fn list_documents(&self, user_id: Uuid) -> Result<Vec<DocumentRecord>>;
    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRecord>;
    async fn delete_document(&self, id: Uuid) -> Result<bool>;

    // Chat log
    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<()>;

    // Platform-wide counts and configuration
    async fn count_users(&self) -> Result<i64>;
    async fn count_active_users(&self) -> Result<i64>;
    async fn count_assistants(&self) -> Result<i64>;
    async fn count_chats(&self) -> Result<i64>;
    async fn get_config_value(&self, key: &str) -> Result<Option<String>>;
    async fn set_config_value(&self, key: &str, value: &str) -> Result<()>;

    /// Liveness probe for the readiness endpoint
    async fn health_check(&self) -> Result<()>;
}
