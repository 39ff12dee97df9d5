//! LLM provider dispatch
//!
//! A thin client over OpenAI-compatible `/chat/completions` endpoints.
//! The assistant's `model_type` selects the provider; deepseek and openai
//! are dialable, perplexity is recognized but has no credentials wired up
//! and is rejected before any network call.

use crate::config::LlmConfig;
use assistant_platform_shared::models::ModelProvider;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Dispatch failure taxonomy
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider '{0}' is not configured")]
    NotConfigured(&'static str),

    #[error("Request to provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned no completion")]
    EmptyResponse,
}

/// One message in the completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Generation parameters forwarded to the provider
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: i32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: i32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

struct ProviderEndpoint {
    base_url: String,
    api_key: Option<Secret<String>>,
}

/// Shared outbound client for all chat-completions providers
pub struct LlmClient {
    http: reqwest::Client,
    deepseek: ProviderEndpoint,
    openai: ProviderEndpoint,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            deepseek: ProviderEndpoint {
                base_url: config.deepseek.base_url.clone(),
                api_key: config.deepseek.api_key.clone().map(Secret::new),
            },
            openai: ProviderEndpoint {
                base_url: config.openai.base_url.clone(),
                api_key: config.openai.api_key.clone().map(Secret::new),
            },
        })
    }

    /// Dispatch one exchange and return the assistant's reply text
    pub async fn chat(
        &self,
        provider: ModelProvider,
        options: &ChatOptions,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let endpoint = match provider {
            ModelProvider::Deepseek => &self.deepseek,
            ModelProvider::Openai => &self.openai,
            ModelProvider::Perplexity => return Err(LlmError::NotConfigured("perplexity")),
        };

        let api_key = endpoint
            .api_key
            .as_ref()
            .ok_or(LlmError::NotConfigured(match provider {
                ModelProvider::Deepseek => "deepseek",
                ModelProvider::Openai => "openai",
                ModelProvider::Perplexity => "perplexity",
            }))?;

        let messages = [
            ChatMessage {
                role: "system",
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user_message.to_string(),
            },
        ];

        let url = format!("{}/chat/completions", endpoint.base_url);
        debug!(provider = %provider, model = %options.model, "Dispatching chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&ChatCompletionRequest {
                model: &options.model,
                messages: &messages,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            // Keep the stored detail bounded; provider error bodies can be huge
            let message = message.chars().take(512).collect();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> LlmConfig {
        LlmConfig {
            deepseek: ProviderConfig {
                base_url: base_url.to_string(),
                api_key: Some("test-key".to_string()),
            },
            openai: ProviderConfig {
                base_url: base_url.to_string(),
                api_key: None,
            },
            request_timeout_secs: 5,
        }
    }

    fn test_options() -> ChatOptions {
        ChatOptions {
            model: "deepseek-chat-67b".to_string(),
            temperature: 0.7,
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("a pirate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Ahoy!"}}]
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).unwrap();
        let reply = client
            .chat(
                ModelProvider::Deepseek,
                &test_options(),
                "You are a pirate",
                "hello",
            )
            .await
            .unwrap();

        assert_eq!(reply, "Ahoy!");
    }

    #[tokio::test]
    async fn test_chat_provider_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .chat(ModelProvider::Deepseek, &test_options(), "sys", "hi")
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .chat(ModelProvider::Deepseek, &test_options(), "sys", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_rejected_without_network() {
        let client = LlmClient::new(&test_config("http://127.0.0.1:1")).unwrap();

        let err = client
            .chat(ModelProvider::Openai, &test_options(), "sys", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured("openai")));

        let err = client
            .chat(ModelProvider::Perplexity, &test_options(), "sys", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured("perplexity")));
    }
}
