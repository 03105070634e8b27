use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ports::PasswordHasher;

/// Argon2id in PHC string format. The parameters travel inside each hash, so
/// changing them only affects new hashes.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom cost; tests use a tiny memory budget to stay fast.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| DomainError::validation("argon2", e.to_string()))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| DomainError::database(format!("salt generation failed: {e}")))?;
        let hash = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::database(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, DomainError> {
        let parsed = PasswordHash::new(encoded)
            .map_err(|e| DomainError::database(format!("unreadable password hash: {e}")))?;
        match self.argon.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::database(format!("password verification failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2PasswordHasher::with_cost(256, 1).unwrap();
        let encoded = hasher.hash("admin123").unwrap();
        assert!(encoded.starts_with("$argon2id$"));
        assert!(!encoded.contains("admin123"));

        assert!(hasher.verify("admin123", &encoded).unwrap());
        assert!(!hasher.verify("admin124", &encoded).unwrap());
    }

    #[test]
    fn salts_differ() {
        let hasher = Argon2PasswordHasher::with_cost(256, 1).unwrap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let hasher = Argon2PasswordHasher::new();
        assert!(hasher.verify("x", "not-a-phc-string").is_err());
    }
}
