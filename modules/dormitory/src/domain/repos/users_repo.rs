use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::contract::model::{User, UserFilter};
use crate::domain::error::DomainError;

/// Repository trait for User persistence operations.
///
/// The password hash is stored next to the user row but never travels inside
/// `User`; it has its own read and write methods.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<User>, DomainError>;

    async fn find_by_username<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        username: &str,
    ) -> Result<Option<User>, DomainError>;

    async fn find_by_student_number<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_number: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Users matching the filter, ordered by username.
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &UserFilter,
    ) -> Result<Vec<User>, DomainError>;

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
        password_hash: String,
    ) -> Result<User, DomainError>;

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
    ) -> Result<User, DomainError>;

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;

    async fn password_hash<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<String>, DomainError>;

    async fn set_password_hash<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        password_hash: String,
    ) -> Result<(), DomainError>;

    /// Uniqueness probes. `exclude` skips the user being updated.
    async fn username_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError>;

    async fn email_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError>;

    async fn student_number_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError>;

    async fn count<C: ConnectionTrait + Send + Sync>(&self, conn: &C) -> Result<u64, DomainError>;
}
