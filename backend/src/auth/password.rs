//! Password hashing using argon2
//!
//! Argon2id with a fresh random salt per hash; the stored form is a PHC
//! string, so derived key, salt, and parameters travel together in one
//! unambiguous encoding.
//!
//! Verification fails closed: a malformed stored form is reported as a
//! plain mismatch, never as an error the caller has to branch on. The
//! comparison itself is constant-time inside the argon2 crate.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password (blocking operation)
    ///
    /// The derivation is deliberately slow and memory-hard. In async
    /// contexts use [`PasswordService::hash_async`].
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored form (blocking operation)
    ///
    /// Returns `false` for a wrong password AND for any malformed stored
    /// form (missing delimiters, bad lengths, unknown algorithm). Callers
    /// get a boolean, nothing else.
    pub fn verify(password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Verify a password on the blocking thread pool
    ///
    /// A failed join also reports a mismatch; verification has no error
    /// channel.
    pub async fn verify_async(password: String, stored: String) -> bool {
        tokio::task::spawn_blocking(move || Self::verify(&password, &stored))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hash = PasswordService::hash(password).unwrap();

        assert!(PasswordService::verify(password, &hash));
        assert!(!PasswordService::verify("wrong_password", &hash));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "test_password";
        let hash1 = PasswordService::hash(password).unwrap();
        let hash2 = PasswordService::hash(password).unwrap();

        // Hashes differ due to random salt
        assert_ne!(hash1, hash2);

        // But both verify correctly
        assert!(PasswordService::verify(password, &hash1));
        assert!(PasswordService::verify(password, &hash2));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let password = "hunter2";
        let hash = PasswordService::hash(password).unwrap();
        assert_ne!(hash, password);
        assert!(!hash.contains(password));
    }

    #[test]
    fn test_verify_malformed_stored_form_fails_closed() {
        assert!(!PasswordService::verify("anything", ""));
        assert!(!PasswordService::verify("anything", "no-delimiters-here"));
        assert!(!PasswordService::verify("anything", "$argon2id$truncated"));
        assert!(!PasswordService::verify(
            "anything",
            "plaintext.with.dots.but.not.a.phc.string"
        ));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password".to_string();
        let hash = PasswordService::hash_async(password.clone()).await.unwrap();

        assert!(PasswordService::verify_async(password.clone(), hash.clone()).await);
        assert!(!PasswordService::verify_async("wrong".to_string(), hash).await);
    }
}
