use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::contract::model::{Room, RoomFilter};
use crate::domain::error::DomainError;

#[async_trait]
pub trait RoomsRepository: Send + Sync {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Room>, DomainError>;

    /// Same as `get`, but holds a row lock until the transaction ends so
    /// occupancy changes on one room are serialized.
    async fn get_for_update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Room>, DomainError>;

    async fn find_by_location<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        building_name: &str,
        room_number: &str,
    ) -> Result<Option<Room>, DomainError>;

    /// Rooms matching the filter, ordered by building then room number.
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &RoomFilter,
    ) -> Result<Vec<Room>, DomainError>;

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room: Room,
    ) -> Result<Room, DomainError>;

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room: Room,
    ) -> Result<Room, DomainError>;

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;

    /// `exclude` skips the room being updated.
    async fn location_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        building_name: &str,
        room_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError>;
}
