use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::contract::model::{RepairFilter, RepairTicket};
use crate::domain::error::DomainError;

#[async_trait]
pub trait RepairsRepository: Send + Sync {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<RepairTicket>, DomainError>;

    /// Newest `requested_at` first.
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &RepairFilter,
    ) -> Result<Vec<RepairTicket>, DomainError>;

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ticket: RepairTicket,
    ) -> Result<RepairTicket, DomainError>;

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ticket: RepairTicket,
    ) -> Result<RepairTicket, DomainError>;

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;

    async fn count_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<u64, DomainError>;

    /// Tickets filed by or assigned to the user.
    async fn count_for_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<u64, DomainError>;
}
