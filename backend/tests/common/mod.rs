//! Common test utilities for integration tests
//!
//! Tests run against the in-memory storage and session backends, so the
//! whole HTTP surface can be exercised without external services. The
//! concrete `MemoryStorage` handle stays available for the few fixtures
//! that need to reach behind the API (e.g. granting the admin flag).

use assistant_platform_backend::auth::MemorySessionStore;
use assistant_platform_backend::config::AppConfig;
use assistant_platform_backend::llm::LlmClient;
use assistant_platform_backend::repositories::{MemoryStorage, Storage, UpdateUser};
use assistant_platform_backend::routes;
use assistant_platform_backend::state::AppState;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

/// A response captured from the in-process app
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `name=token` pair from Set-Cookie, ready to send back
    pub fn cookie(&self) -> Option<String> {
        let set_cookie = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        Some(set_cookie.split(';').next()?.trim().to_string())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    /// App with everything in memory and no reachable LLM provider
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// App whose deepseek provider points at a local mock server
    pub fn with_llm_base_url(base_url: &str) -> Self {
        let mut config = test_config();
        config.llm.deepseek.base_url = base_url.to_string();
        config.llm.deepseek.api_key = Some("test-key".to_string());
        Self::with_config(config)
    }

    fn with_config(config: AppConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let llm = Arc::new(LlmClient::new(&config.llm).expect("llm client"));

        let dyn_storage: Arc<dyn Storage> = storage.clone();
        let state = AppState::new(dyn_storage, sessions, llm, config);
        let app = routes::create_router(state);

        Self { app, storage }
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.request("GET", path, cookie, None).await
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>, body: &str) -> TestResponse {
        self.request("POST", path, cookie, Some(body)).await
    }

    pub async fn patch(&self, path: &str, cookie: Option<&str>, body: &str) -> TestResponse {
        self.request("PATCH", path, cookie, Some(body)).await
    }

    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.request("DELETE", path, cookie, None).await
    }

    /// Register a user via the API, returning the session cookie
    pub async fn register(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self.post("/api/register", None, &body.to_string()).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.cookie().expect("register sets a session cookie")
    }

    /// Grant the admin flag to an existing user, bypassing the API
    pub async fn make_admin(&self, username: &str) {
        let user = self
            .storage
            .find_user_by_username(username)
            .await
            .unwrap()
            .expect("user exists");
        self.storage
            .update_user(
                user.id,
                UpdateUser {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = "memory".to_string();
    config.session.cookie_name = "ap_session".to_string();
    config.session.ttl_secs = 3600;
    config.session.cookie_secure = Some(false);
    config
}
