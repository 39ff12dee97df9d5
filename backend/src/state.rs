//! Application state management
//!
//! Shared state handed to every request handler via Axum's state
//! extraction. All fields are Arc'd trait objects or Arc'd data, so a
//! clone per request is a handful of refcount bumps; the backing
//! implementations (Postgres, Redis, memory) were chosen once at startup
//! and are immutable from here on.

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::llm::LlmClient;
use crate::repositories::Storage;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// User directory and tenant data
    pub storage: Arc<dyn Storage>,
    /// Server-side session store
    pub sessions: Arc<dyn SessionStore>,
    /// Outbound LLM provider client
    pub llm: Arc<LlmClient>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        sessions: Arc<dyn SessionStore>,
        llm: Arc<LlmClient>,
        config: AppConfig,
    ) -> Self {
        Self {
            storage,
            sessions,
            llm,
            config: Arc::new(config),
        }
    }

    /// Session lifetime in seconds
    #[inline]
    pub fn session_ttl(&self) -> i64 {
        self.config.session.ttl_secs
    }
}
