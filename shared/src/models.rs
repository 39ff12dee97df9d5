//! Domain enumerations and assistant configuration
//!
//! These mirror the values persisted by the backend. Database records store
//! the lowercase string forms; parsing is lenient about case but strict
//! about membership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier constraining a user's resource quotas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Trial,
    Monthly,
    Yearly,
    #[default]
    Free,
    Admin,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Trial => "trial",
            SubscriptionTier::Monthly => "monthly",
            SubscriptionTier::Yearly => "yearly",
            SubscriptionTier::Free => "free",
            SubscriptionTier::Admin => "admin",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trial" => Ok(SubscriptionTier::Trial),
            "monthly" => Ok(SubscriptionTier::Monthly),
            "yearly" => Ok(SubscriptionTier::Yearly),
            "free" => Ok(SubscriptionTier::Free),
            "admin" => Ok(SubscriptionTier::Admin),
            other => Err(format!("Unknown subscription tier: {}", other)),
        }
    }
}

/// LLM provider backing an assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Deepseek,
    Perplexity,
    Openai,
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Deepseek => "deepseek",
            ModelProvider::Perplexity => "perplexity",
            ModelProvider::Openai => "openai",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deepseek" => Ok(ModelProvider::Deepseek),
            "perplexity" => Ok(ModelProvider::Perplexity),
            "openai" => Ok(ModelProvider::Openai),
            other => Err(format!("Unknown model provider: {}", other)),
        }
    }
}

/// Assistant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssistantStatus {
    #[default]
    Active,
    Inactive,
}

impl AssistantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantStatus::Active => "active",
            AssistantStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AssistantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AssistantStatus::Active),
            "inactive" => Ok(AssistantStatus::Inactive),
            other => Err(format!("Unknown assistant status: {}", other)),
        }
    }
}

/// Per-assistant generation parameters
///
/// An empty `model` means "use the platform default model".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: i32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-chat-67b".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}
