use crate::domain::error::DomainError;

/// Output port for credential hashing. Storage only ever sees the encoded hash.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is unreadable.
    fn verify(&self, password: &str, encoded: &str) -> Result<bool, DomainError>;
}
