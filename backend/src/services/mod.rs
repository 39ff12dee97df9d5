//! Business logic services
//!
//! Services encapsulate business logic and coordinate between the storage
//! boundary, the session store, and the LLM dispatch client.

pub mod admin;
pub mod assistants;
pub mod chat;
pub mod documents;
pub mod users;

pub use admin::AdminService;
pub use assistants::AssistantService;
pub use chat::ChatService;
pub use documents::DocumentService;
pub use users::UserService;

/// Platform-config key holding the fallback model for assistants whose
/// own config does not name one
pub const DEFAULT_MODEL_KEY: &str = "default_model";
