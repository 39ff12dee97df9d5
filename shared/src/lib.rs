//! Assistant Platform Shared Library
//!
//! This crate contains the API types, domain enumerations, and input
//! validation shared between the backend and any client crates.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::*;
pub use types::*;
