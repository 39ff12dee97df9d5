//! In-memory storage backend
//!
//! Backs local development and the integration test suite. Semantics match
//! the Postgres backend: unique usernames, COALESCE-style partial updates,
//! and cascading document detachment.

use super::{
    AssistantRecord, DocumentRecord, NewAssistant, NewChatMessage, NewDocument, NewUser, Storage,
    UpdateAssistant, UpdateUser, UserRecord,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    assistants: HashMap<Uuid, AssistantRecord>,
    documents: HashMap<Uuid, DocumentRecord>,
    assistant_documents: HashMap<Uuid, Vec<Uuid>>,
    chat_count: i64,
    config: HashMap<String, String>,
}

/// Process-local storage behind a single lock
///
/// Lock scopes never span an await point.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.values().any(|u| u.username == user.username) {
            bail!("duplicate username: {}", user.username);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            company_name: user.company_name,
            email: user.email,
            phone: user.phone,
            instagram: None,
            telegram: None,
            payment_method: None,
            subscription: user.subscription,
            plan_start: None,
            plan_end: None,
            is_admin: user.is_admin,
            max_assistants: user.max_assistants,
            allowed_platforms: Json(user.allowed_platforms),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, id: Uuid, updates: UpdateUser) -> Result<Option<UserRecord>> {
        let mut inner = self.inner.write().unwrap();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(v) = updates.company_name {
            user.company_name = Some(v);
        }
        if let Some(v) = updates.email {
            user.email = Some(v);
        }
        if let Some(v) = updates.phone {
            user.phone = Some(v);
        }
        if let Some(v) = updates.instagram {
            user.instagram = Some(v);
        }
        if let Some(v) = updates.telegram {
            user.telegram = Some(v);
        }
        if let Some(v) = updates.payment_method {
            user.payment_method = Some(v);
        }
        if let Some(v) = updates.subscription {
            user.subscription = v;
        }
        if let Some(v) = updates.plan_start {
            user.plan_start = Some(v);
        }
        if let Some(v) = updates.plan_end {
            user.plan_end = Some(v);
        }
        if let Some(v) = updates.is_admin {
            user.is_admin = v;
        }
        if let Some(v) = updates.max_assistants {
            user.max_assistants = v;
        }
        if let Some(v) = updates.allowed_platforms {
            user.allowed_platforms = Json(v);
        }
        if let Some(v) = updates.is_active {
            user.is_active = v;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let inner = self.inner.read().unwrap();
        let mut users: Vec<_> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_assistant(&self, id: Uuid) -> Result<Option<AssistantRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.assistants.get(&id).cloned())
    }

    async fn list_assistants(&self, user_id: Uuid) -> Result<Vec<AssistantRecord>> {
        let inner = self.inner.read().unwrap();
        let mut assistants: Vec<_> = inner
            .assistants
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        assistants.sort_by_key(|a| a.created_at);
        Ok(assistants)
    }

    async fn count_assistants_for_user(&self, user_id: Uuid) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .assistants
            .values()
            .filter(|a| a.user_id == user_id)
            .count() as i64)
    }

    async fn insert_assistant(&self, assistant: NewAssistant) -> Result<AssistantRecord> {
        let mut inner = self.inner.write().unwrap();
        let now = Utc::now();
        let record = AssistantRecord {
            id: Uuid::new_v4(),
            user_id: assistant.user_id,
            name: assistant.name,
            personality: assistant.personality,
            model_type: assistant.model_type,
            platforms: Json(assistant.platforms),
            status: assistant.status,
            config: Json(assistant.config),
            created_at: now,
            updated_at: now,
        };
        inner.assistants.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_assistant(
        &self,
        id: Uuid,
        updates: UpdateAssistant,
    ) -> Result<Option<AssistantRecord>> {
        let mut inner = self.inner.write().unwrap();
        let Some(assistant) = inner.assistants.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(v) = updates.name {
            assistant.name = v;
        }
        if let Some(v) = updates.personality {
            assistant.personality = v;
        }
        if let Some(v) = updates.model_type {
            assistant.model_type = v;
        }
        if let Some(v) = updates.platforms {
            assistant.platforms = Json(v);
        }
        if let Some(v) = updates.status {
            assistant.status = v;
        }
        if let Some(v) = updates.config {
            assistant.config = Json(v);
        }
        assistant.updated_at = Utc::now();

        Ok(Some(assistant.clone()))
    }

    async fn assistant_document_ids(&self, assistant_id: Uuid) -> Result<Vec<Uuid>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .assistant_documents
            .get(&assistant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_assistant_documents(
        &self,
        assistant_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .assistant_documents
            .insert(assistant_id, document_ids.to_vec());
        Ok(())
    }

    async fn documents_for_assistant(&self, assistant_id: Uuid) -> Result<Vec<DocumentRecord>> {
        let inner = self.inner.read().unwrap();
        let ids = inner
            .assistant_documents
            .get(&assistant_id)
            .cloned()
            .unwrap_or_default();
        let mut documents: Vec<_> = ids
            .iter()
            .filter_map(|id| inner.documents.get(id).cloned())
            .collect();
        documents.sort_by_key(|d| d.created_at);
        Ok(documents)
    }

    async fn find_document(&self, id: Uuid) -> Result<Option<DocumentRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.documents.get(&id).cloned())
    }

    async fn list_documents(&self, user_id: Uuid) -> Result<Vec<DocumentRecord>> {
        let inner = self.inner.read().unwrap();
        let mut documents: Vec<_> = inner
            .documents
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by_key(|d| d.created_at);
        Ok(documents)
    }

    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRecord> {
        let mut inner = self.inner.write().unwrap();
        let record = DocumentRecord {
            id: Uuid::new_v4(),
            user_id: document.user_id,
            name: document.name,
            content: document.content,
            doc_type: document.doc_type,
            created_at: Utc::now(),
        };
        inner.documents.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        let removed = inner.documents.remove(&id).is_some();
        if removed {
            // Detach from any assistant that referenced it
            for ids in inner.assistant_documents.values_mut() {
                ids.retain(|d| *d != id);
            }
        }
        Ok(removed)
    }

    async fn insert_chat_message(&self, _message: NewChatMessage) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.chat_count += 1;
        Ok(())
    }

    async fn count_users(&self) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.len() as i64)
    }

    async fn count_active_users(&self) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.values().filter(|u| u.is_active).count() as i64)
    }

    async fn count_assistants(&self) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.assistants.len() as i64)
    }

    async fn count_chats(&self) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.chat_count)
    }

    async fn get_config_value(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.config.get(key).cloned())
    }

    async fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            company_name: None,
            email: None,
            phone: None,
            subscription: "free".to_string(),
            is_admin: false,
            max_assistants: 1,
            allowed_platforms: vec!["web".to_string()],
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let storage = MemoryStorage::new();
        let user = storage.insert_user(new_user("alice")).await.unwrap();

        let by_id = storage.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        let by_name = storage
            .find_user_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let storage = MemoryStorage::new();
        storage.insert_user(new_user("alice")).await.unwrap();
        assert!(storage.insert_user(new_user("alice")).await.is_err());
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let storage = MemoryStorage::new();
        let user = storage.insert_user(new_user("alice")).await.unwrap();

        let updated = storage
            .update_user(
                user.id,
                UpdateUser {
                    max_assistants: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.max_assistants, 5);
        assert_eq!(updated.username, "alice");
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_document_detaches_from_assistants() {
        let storage = MemoryStorage::new();
        let user = storage.insert_user(new_user("alice")).await.unwrap();

        let document = storage
            .insert_document(NewDocument {
                user_id: user.id,
                name: "faq.txt".to_string(),
                content: "Q & A".to_string(),
                doc_type: "txt".to_string(),
            })
            .await
            .unwrap();

        let assistant = storage
            .insert_assistant(NewAssistant {
                user_id: user.id,
                name: "Support".to_string(),
                personality: "helpful".to_string(),
                model_type: "deepseek".to_string(),
                platforms: vec!["web".to_string()],
                status: "active".to_string(),
                config: Default::default(),
            })
            .await
            .unwrap();

        storage
            .set_assistant_documents(assistant.id, &[document.id])
            .await
            .unwrap();

        assert!(storage.delete_document(document.id).await.unwrap());
        let ids = storage.assistant_document_ids(assistant.id).await.unwrap();
        assert!(ids.is_empty());
    }
}
