//! Chat service: message dispatch to the assistant's provider
//!
//! Builds the system prompt from the assistant's personality plus any
//! attached context documents, resolves the model (assistant config,
//! falling back to the platform default), forwards the exchange, and
//! appends both sides to the chat log.

use crate::error::ApiError;
use crate::llm::{ChatOptions, LlmClient, LlmError};
use crate::repositories::{DocumentRecord, NewChatMessage, Storage, UserRecord};
use crate::services::DEFAULT_MODEL_KEY;
use assistant_platform_shared::models::{AssistantStatus, ModelProvider};
use assistant_platform_shared::types::{ChatRequest, ChatResponse};

/// Upper bound on document context characters in the system prompt
const CONTEXT_CHAR_BUDGET: usize = 8000;

/// Chat service
pub struct ChatService;

impl ChatService {
    /// Handle one chat exchange for `user`
    pub async fn send(
        storage: &dyn Storage,
        llm: &LlmClient,
        user: &UserRecord,
        req: &ChatRequest,
    ) -> Result<ChatResponse, ApiError> {
        if req.message.trim().is_empty() {
            return Err(ApiError::Validation("Message cannot be empty".to_string()));
        }

        let assistant = storage
            .find_assistant(req.assistant_id)
            .await
            .map_err(ApiError::Internal)?
            .filter(|a| a.user_id == user.id)
            .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))?;

        if assistant.status.parse::<AssistantStatus>().unwrap_or_default()
            != AssistantStatus::Active
        {
            return Err(ApiError::BadRequest("Assistant is inactive".to_string()));
        }

        let provider: ModelProvider = assistant
            .model_type
            .parse()
            .map_err(|_| ApiError::BadRequest("Unsupported model provider".to_string()))?;

        let documents = storage
            .documents_for_assistant(assistant.id)
            .await
            .map_err(ApiError::Internal)?;
        let system_prompt = build_system_prompt(&assistant.personality, &documents);

        let model = if assistant.config.model.is_empty() {
            storage
                .get_config_value(DEFAULT_MODEL_KEY)
                .await
                .map_err(ApiError::Internal)?
                .unwrap_or_else(|| {
                    assistant_platform_shared::models::AssistantConfig::default().model
                })
        } else {
            assistant.config.model.clone()
        };

        let options = ChatOptions {
            model,
            temperature: assistant.config.temperature,
            max_tokens: assistant.config.max_tokens,
        };

        let reply = llm
            .chat(provider, &options, &system_prompt, &req.message)
            .await
            .map_err(|e| match e {
                LlmError::NotConfigured(name) => {
                    ApiError::BadRequest(format!("Model provider '{}' is not configured", name))
                }
                other => ApiError::Upstream(other.to_string()),
            })?;

        // Log both sides of the exchange for history and platform stats
        storage
            .insert_chat_message(NewChatMessage {
                assistant_id: assistant.id,
                user_id: user.id,
                role: "user".to_string(),
                content: req.message.clone(),
            })
            .await
            .map_err(ApiError::Internal)?;
        storage
            .insert_chat_message(NewChatMessage {
                assistant_id: assistant.id,
                user_id: user.id,
                role: "assistant".to_string(),
                content: reply.clone(),
            })
            .await
            .map_err(ApiError::Internal)?;

        Ok(ChatResponse { reply })
    }
}

/// Compose the system prompt from personality and attached documents
fn build_system_prompt(personality: &str, documents: &[DocumentRecord]) -> String {
    let mut prompt = format!(
        "You are a virtual assistant with the following personality: {}. Respond accordingly.",
        personality
    );

    if documents.is_empty() {
        return prompt;
    }

    prompt.push_str("\n\nUse the following reference material when it is relevant:");
    let mut remaining = CONTEXT_CHAR_BUDGET;
    for document in documents {
        if remaining == 0 {
            break;
        }
        let excerpt: String = document.content.chars().take(remaining).collect();
        remaining -= excerpt.chars().count();
        prompt.push_str(&format!("\n\n[{}]\n{}", document.name, excerpt));
    }

    prompt
}
