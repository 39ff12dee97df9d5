//! Server-side session store
//!
//! A session binds an opaque client-held token to a user id with an
//! expiry. Tokens carry 256 bits of OS entropy and are never derived from
//! anything; possession of the cookie is the whole credential, so the
//! stored record needs no signature.
//!
//! Three backends implement [`SessionStore`]; the choice is made once at
//! startup and injected. All of them resolve an expired token to `None`
//! (deleting it where that is not automatic).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Token length in bytes before hex encoding
const TOKEN_BYTES: usize = 32;

/// A server-side session record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Generate a fresh opaque session token (64 hex chars)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Keyed session persistence, safe for concurrent request handling
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for `user_id` valid for `ttl_secs`
    async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Result<SessionRecord>;

    /// Resolve a token; expired or unknown tokens yield `None`
    async fn get(&self, token: &str) -> Result<Option<SessionRecord>>;

    /// Destroy a session; deleting an unknown token is not an error
    async fn delete(&self, token: &str) -> Result<()>;

    /// Remove expired sessions, returning how many were dropped
    async fn delete_expired(&self) -> Result<u64>;
}

fn new_record(user_id: Uuid, ttl_secs: i64) -> SessionRecord {
    let now = Utc::now();
    SessionRecord {
        token: generate_token(),
        user_id,
        expires_at: now + Duration::seconds(ttl_secs),
        created_at: now,
    }
}

// ============================================================================
// Postgres backend
// ============================================================================

/// Sessions table backend
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Result<SessionRecord> {
        let record = new_record(user_id, ttl_secs);
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT token, user_id, expires_at, created_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match session {
            Some(s) if s.is_expired() => {
                self.delete(token).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// Redis backend
// ============================================================================

/// Redis backend; expiry is enforced by the key TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Result<SessionRecord> {
        let record = new_record(user_id, ttl_secs);
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.conn.clone();
        redis::cmd("SETEX")
            .arg(Self::key(&record.token))
            .arg(ttl_secs)
            .arg(payload)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(record)
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        let record: SessionRecord = serde_json::from_str(&payload)?;
        if record.is_expired() {
            // The key TTL should have removed it already; don't trust clocks
            self.delete(token).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(Self::key(token))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        // Redis evicts on key TTL; nothing to sweep
        Ok(0)
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Process-local backend for tests and the memory storage mode
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Result<SessionRecord> {
        let record = new_record(user_id, ttl_secs);
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut sessions = self.sessions.write().unwrap();
        let Some(record) = sessions.get(token).cloned() else {
            return Ok(None);
        };
        if record.is_expired() {
            sessions.remove(token);
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions.write().unwrap().remove(token);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

// ============================================================================
// Cookie plumbing
// ============================================================================

/// Build the Set-Cookie value establishing a session
pub fn build_session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value clearing the session cookie
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    build_session_cookie(name, "", 0, secure)
}

/// Extract the session token from a Cookie request header
pub fn token_from_cookie_header(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_cookie_round_trip() {
        let cookie = build_session_cookie("ap_session", "abc123", 3600, false);
        assert!(cookie.starts_with("ap_session=abc123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));

        let secure = build_session_cookie("ap_session", "abc123", 3600, true);
        assert!(secure.contains("Secure"));
    }

    #[test]
    fn test_token_from_cookie_header() {
        let header = "theme=dark; ap_session=abc123; lang=en";
        assert_eq!(
            token_from_cookie_header(header, "ap_session"),
            Some("abc123".to_string())
        );
        assert_eq!(token_from_cookie_header(header, "other"), None);
        assert_eq!(token_from_cookie_header("ap_session=", "ap_session"), None);
    }

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::new_v4();

        let session = store.create(user_id, 3600).await.unwrap();
        let found = store.get(&session.token).await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);

        store.delete(&session.token).await.unwrap();
        assert!(store.get(&session.token).await.unwrap().is_none());

        // Deleting again is fine
        store.delete(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemorySessionStore::new();
        let session = store.create(Uuid::new_v4(), -1).await.unwrap();

        assert!(store.get(&session.token).await.unwrap().is_none());

        // Already removed by the lazy purge in get
        assert_eq!(store.delete_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_store_sweep() {
        let store = MemorySessionStore::new();
        store.create(Uuid::new_v4(), -1).await.unwrap();
        store.create(Uuid::new_v4(), 3600).await.unwrap();

        assert_eq!(store.delete_expired().await.unwrap(), 1);
    }
}
