//! Salted one-way password hashing (bcrypt).

use super::AuthError;

/// bcrypt hasher with a configured work factor.
///
/// Every hash embeds a fresh random salt, so two hashes of the same
/// plaintext differ.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `false`, never an error. A malformed stored hash also
    /// yields `false` so callers cannot tell it apart from a wrong password.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }

    /// Hash on the blocking pool; bcrypt is deliberately CPU-heavy.
    pub async fn hash_async(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// Verify on the blocking pool.
    pub async fn verify_async(&self, plaintext: String, hash: String) -> bool {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hasher().hash("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$2"));
        assert!(hasher().verify("correct horse", &hash));
        assert!(!hasher().verify("wrong horse", &hash));
        assert!(!hasher().verify("", &hash));
    }

    #[test]
    fn test_same_plaintext_different_hashes() {
        let a = hasher().hash("secret123").unwrap();
        let b = hasher().hash("secret123").unwrap();
        assert_ne!(a, b);
        assert!(hasher().verify("secret123", &a));
        assert!(hasher().verify("secret123", &b));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        assert!(!hasher().verify("secret123", "not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn test_async_variants() {
        let hash = hasher().hash_async("pw-async".to_string()).await.unwrap();
        assert!(
            hasher()
                .verify_async("pw-async".to_string(), hash.clone())
                .await
        );
        assert!(!hasher().verify_async("nope".to_string(), hash).await);
    }
}
