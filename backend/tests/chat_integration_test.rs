//! Integration tests for chat dispatch, with the provider stubbed out

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_chat_end_to_end_with_context_documents() {
    let server = MockServer::start().await;
    // The system prompt must carry both the personality and the attached
    // document content
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("cheerful sommelier"))
        .and(body_string_contains("Riesling pairs with spicy food"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "To wine!"}}]
        })))
        .mount(&server)
        .await;

    let app = TestApp::with_llm_base_url(&server.uri());
    let cookie = app.register("alice", "pw1").await;

    let doc = app
        .post(
            "/api/documents",
            Some(&cookie),
            &json!({
                "name": "pairings.txt",
                "content": "Riesling pairs with spicy food",
                "docType": "txt"
            })
            .to_string(),
        )
        .await;
    let doc_id = doc.json()["id"].as_str().unwrap().to_string();

    let assistant = app
        .post(
            "/api/assistants",
            Some(&cookie),
            &json!({
                "name": "Wine bot",
                "personality": "cheerful sommelier",
                "documentIds": [doc_id]
            })
            .to_string(),
        )
        .await;
    let assistant_id = assistant.json()["id"].as_str().unwrap().to_string();

    let chat = app
        .post(
            "/api/chat",
            Some(&cookie),
            &json!({"assistantId": assistant_id, "message": "what goes with curry?"}).to_string(),
        )
        .await;
    assert_eq!(chat.status, StatusCode::OK, "{}", chat.body);
    assert_eq!(chat.json()["reply"], "To wine!");

    // Both sides of the exchange were logged
    let admin = app.register("root", "rootpw").await;
    app.make_admin("root").await;
    let stats = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(stats.json()["totalChats"], 2);
}

#[tokio::test]
async fn test_chat_requires_active_assistant() {
    let server = MockServer::start().await;
    let app = TestApp::with_llm_base_url(&server.uri());
    let cookie = app.register("alice", "pw1").await;

    let assistant = app
        .post(
            "/api/assistants",
            Some(&cookie),
            &json!({
                "name": "Sleeping",
                "personality": "dormant",
                "status": "inactive"
            })
            .to_string(),
        )
        .await;
    let assistant_id = assistant.json()["id"].as_str().unwrap().to_string();

    let chat = app
        .post(
            "/api/chat",
            Some(&cookie),
            &json!({"assistantId": assistant_id, "message": "wake up"}).to_string(),
        )
        .await;
    assert_eq!(chat.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_with_foreign_assistant_is_not_found() {
    let server = MockServer::start().await;
    let app = TestApp::with_llm_base_url(&server.uri());

    let alice = app.register("alice", "pw1").await;
    let bob = app.register("bob", "pw2").await;

    let assistant = app
        .post(
            "/api/assistants",
            Some(&alice),
            &json!({"name": "Private", "personality": "loyal"}).to_string(),
        )
        .await;
    let assistant_id = assistant.json()["id"].as_str().unwrap().to_string();

    let chat = app
        .post(
            "/api/chat",
            Some(&bob),
            &json!({"assistantId": assistant_id, "message": "hello"}).to_string(),
        )
        .await;
    assert_eq!(chat.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_with_unconfigured_provider() {
    let server = MockServer::start().await;
    let app = TestApp::with_llm_base_url(&server.uri());
    let cookie = app.register("alice", "pw1").await;

    // openai has no API key in the test configuration
    let assistant = app
        .post(
            "/api/assistants",
            Some(&cookie),
            &json!({
                "name": "GPT bot",
                "personality": "curious",
                "modelType": "openai"
            })
            .to_string(),
        )
        .await;
    let assistant_id = assistant.json()["id"].as_str().unwrap().to_string();

    let chat = app
        .post(
            "/api/chat",
            Some(&cookie),
            &json!({"assistantId": assistant_id, "message": "hello"}).to_string(),
        )
        .await;
    assert_eq!(chat.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_provider_failure_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let app = TestApp::with_llm_base_url(&server.uri());
    let cookie = app.register("alice", "pw1").await;

    let assistant = app
        .post(
            "/api/assistants",
            Some(&cookie),
            &json!({"name": "Flaky", "personality": "unlucky"}).to_string(),
        )
        .await;
    let assistant_id = assistant.json()["id"].as_str().unwrap().to_string();

    let chat = app
        .post(
            "/api/chat",
            Some(&cookie),
            &json!({"assistantId": assistant_id, "message": "hello"}).to_string(),
        )
        .await;
    assert_eq!(chat.status, StatusCode::BAD_GATEWAY);

    // Failed exchanges are not logged
    let admin = app.register("root", "rootpw").await;
    app.make_admin("root").await;
    let stats = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(stats.json()["totalChats"], 0);
}
