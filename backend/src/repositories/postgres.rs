//! PostgreSQL storage backend

use super::{
    AssistantRecord, DocumentRecord, NewAssistant, NewChatMessage, NewDocument, NewUser, Storage,
    UpdateAssistant, UpdateUser, UserRecord,
};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, password_hash, company_name, email, phone, instagram, \
     telegram, payment_method, subscription, plan_start, plan_end, is_admin, max_assistants, \
     allowed_platforms, is_active, created_at, updated_at";

const ASSISTANT_COLUMNS: &str =
    "id, user_id, name, personality, model_type, platforms, status, config, created_at, updated_at";

/// Production storage over a connection pool
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (username, password_hash, company_name, email, phone,
                               subscription, is_admin, max_assistants, allowed_platforms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.company_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.subscription)
        .bind(user.is_admin)
        .bind(user.max_assistants)
        .bind(Json(&user.allowed_platforms))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_user(&self, id: Uuid, updates: UpdateUser) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                company_name = COALESCE($2, company_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                instagram = COALESCE($5, instagram),
                telegram = COALESCE($6, telegram),
                payment_method = COALESCE($7, payment_method),
                subscription = COALESCE($8, subscription),
                plan_start = COALESCE($9, plan_start),
                plan_end = COALESCE($10, plan_end),
                is_admin = COALESCE($11, is_admin),
                max_assistants = COALESCE($12, max_assistants),
                allowed_platforms = COALESCE($13, allowed_platforms),
                is_active = COALESCE($14, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(updates.company_name)
        .bind(updates.email)
        .bind(updates.phone)
        .bind(updates.instagram)
        .bind(updates.telegram)
        .bind(updates.payment_method)
        .bind(updates.subscription)
        .bind(updates.plan_start)
        .bind(updates.plan_end)
        .bind(updates.is_admin)
        .bind(updates.max_assistants)
        .bind(updates.allowed_platforms.map(Json))
        .bind(updates.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_assistant(&self, id: Uuid) -> Result<Option<AssistantRecord>> {
        let assistant = sqlx::query_as::<_, AssistantRecord>(&format!(
            "SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assistant)
    }

    async fn list_assistants(&self, user_id: Uuid) -> Result<Vec<AssistantRecord>> {
        let assistants = sqlx::query_as::<_, AssistantRecord>(&format!(
            "SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assistants)
    }

    async fn count_assistants_for_user(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assistants WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_assistant(&self, assistant: NewAssistant) -> Result<AssistantRecord> {
        let record = sqlx::query_as::<_, AssistantRecord>(&format!(
            r#"
            INSERT INTO assistants (user_id, name, personality, model_type, platforms, status, config)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ASSISTANT_COLUMNS}
            "#
        ))
        .bind(assistant.user_id)
        .bind(&assistant.name)
        .bind(&assistant.personality)
        .bind(&assistant.model_type)
        .bind(Json(&assistant.platforms))
        .bind(&assistant.status)
        .bind(Json(&assistant.config))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_assistant(
        &self,
        id: Uuid,
        updates: UpdateAssistant,
    ) -> Result<Option<AssistantRecord>> {
        let record = sqlx::query_as::<_, AssistantRecord>(&format!(
            r#"
            UPDATE assistants SET
                name = COALESCE($2, name),
                personality = COALESCE($3, personality),
                model_type = COALESCE($4, model_type),
                platforms = COALESCE($5, platforms),
                status = COALESCE($6, status),
                config = COALESCE($7, config),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ASSISTANT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(updates.name)
        .bind(updates.personality)
        .bind(updates.model_type)
        .bind(updates.platforms.map(Json))
        .bind(updates.status)
        .bind(updates.config.map(Json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn assistant_document_ids(&self, assistant_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT document_id FROM assistant_documents WHERE assistant_id = $1",
        )
        .bind(assistant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn set_assistant_documents(
        &self,
        assistant_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM assistant_documents WHERE assistant_id = $1")
            .bind(assistant_id)
            .execute(&mut *tx)
            .await?;

        for document_id in document_ids {
            sqlx::query(
                "INSERT INTO assistant_documents (assistant_id, document_id) VALUES ($1, $2)",
            )
            .bind(assistant_id)
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn documents_for_assistant(&self, assistant_id: Uuid) -> Result<Vec<DocumentRecord>> {
        let documents = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT d.id, d.user_id, d.name, d.content, d.doc_type, d.created_at
            FROM documents d
            JOIN assistant_documents ad ON ad.document_id = d.id
            WHERE ad.assistant_id = $1
            ORDER BY d.created_at
            "#,
        )
        .bind(assistant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn find_document(&self, id: Uuid) -> Result<Option<DocumentRecord>> {
        let document = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, user_id, name, content, doc_type, created_at FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn list_documents(&self, user_id: Uuid) -> Result<Vec<DocumentRecord>> {
        let documents = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT id, user_id, name, content, doc_type, created_at
            FROM documents
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRecord> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            r#"
            INSERT INTO documents (user_id, name, content, doc_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, content, doc_type, created_at
            "#,
        )
        .bind(document.user_id)
        .bind(&document.name)
        .bind(&document.content)
        .bind(&document.doc_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (assistant_id, user_id, role, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(message.assistant_id)
        .bind(message.user_id)
        .bind(&message.role)
        .bind(&message.content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_active_users(&self) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_assistants(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM assistants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_chats(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn get_config_value(&self, key: &str) -> Result<Option<String>> {
        let value =
            sqlx::query_scalar::<_, String>("SELECT value FROM platform_config WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    async fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO platform_config (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
