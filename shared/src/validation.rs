//! Input validation functions
//!
//! Validation lives here so the backend and any client crates agree on the
//! rules before a request ever reaches the server.

use crate::models::AssistantConfig;

/// Platform tags an assistant (or user allowance) may carry
pub const VALID_PLATFORMS: &[&str] = &["web", "instagram", "telegram", "whatsapp"];

/// Validate a username
///
/// Usernames are immutable after registration, so the rules are strict:
/// 1-64 chars, letters/digits/dot/underscore/dash only.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.len() > 64 {
        return Err("Username too long".to_string());
    }
    let re = regex_lite::Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
    if !re.is_match(username) {
        return Err(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        );
    }
    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a set of platform tags
pub fn validate_platforms(platforms: &[String]) -> Result<(), String> {
    if platforms.is_empty() {
        return Err("At least one platform is required".to_string());
    }
    for p in platforms {
        let normalized = p.to_lowercase();
        if !VALID_PLATFORMS.contains(&normalized.as_str()) {
            return Err(format!(
                "Invalid platform '{}'. Must be one of: {}",
                p,
                VALID_PLATFORMS.join(", ")
            ));
        }
    }
    Ok(())
}

/// Validate assistant generation parameters
pub fn validate_assistant_config(config: &AssistantConfig) -> Result<(), String> {
    if config.temperature.is_nan() || !(0.0..=1.0).contains(&config.temperature) {
        return Err("Temperature must be between 0 and 1".to_string());
    }
    if !(1..=4000).contains(&config.max_tokens) {
        return Err("Max tokens must be between 1 and 4000".to_string());
    }
    Ok(())
}

/// Validate a document type tag
pub fn validate_doc_type(doc_type: &str) -> Result<(), String> {
    const VALID_DOC_TYPES: &[&str] = &["txt", "md", "pdf", "docx", "xlsx"];
    let normalized = doc_type.to_lowercase();
    if VALID_DOC_TYPES.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(format!(
            "Unsupported document type '{}'. Must be one of: {}",
            doc_type,
            VALID_DOC_TYPES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice")]
    #[case("alice.dev")]
    #[case("a_b-c.9")]
    fn test_valid_usernames(#[case] name: &str) {
        assert!(validate_username(name).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    #[case("emoji🙂")]
    fn test_invalid_usernames(#[case] name: &str) {
        assert!(validate_username(name).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("pw1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_platform_membership() {
        assert!(validate_platforms(&["web".to_string()]).is_ok());
        assert!(validate_platforms(&["Telegram".to_string()]).is_ok());
        assert!(validate_platforms(&["carrier-pigeon".to_string()]).is_err());
        assert!(validate_platforms(&[]).is_err());
    }

    #[test]
    fn test_assistant_config_ranges() {
        assert!(validate_assistant_config(&AssistantConfig::default()).is_ok());

        let mut config = AssistantConfig::default();
        config.temperature = 1.5;
        assert!(validate_assistant_config(&config).is_err());

        let mut config = AssistantConfig::default();
        config.max_tokens = 0;
        assert!(validate_assistant_config(&config).is_err());
    }

    #[test]
    fn test_doc_types() {
        assert!(validate_doc_type("txt").is_ok());
        assert!(validate_doc_type("PDF").is_ok());
        assert!(validate_doc_type("exe").is_err());
    }
}
