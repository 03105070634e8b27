use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::contract::model::{Room, RoomFilter, RoomStatus};
use crate::domain::error::DomainError;
use crate::domain::repos::RoomsRepository;
use crate::infra::storage::db_err;
use crate::infra::storage::entity::room::{Column, Entity};
use crate::infra::storage::mapper::{room_from_model, room_to_active};

/// ORM-based implementation of the `RoomsRepository` trait.
#[derive(Clone, Default)]
pub struct OrmRoomsRepository;

impl OrmRoomsRepository {
    pub fn new() -> Self {
        Self
    }
}

fn filter_condition(filter: &RoomFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(building) = &filter.building_name {
        cond = cond.add(Column::BuildingName.eq(building.as_str()));
    }
    if let Some(room_type) = filter.room_type {
        cond = cond.add(Column::RoomType.eq(room_type.as_str()));
    }
    if let Some(status) = filter.status {
        cond = cond.add(Column::Status.eq(status.as_str()));
    }
    if filter.available_only {
        cond = cond
            .add(Column::Status.eq(RoomStatus::Available.as_str()))
            .add(Expr::col(Column::Occupancy).lt(Expr::col(Column::Capacity)));
    }
    if filter.full_only {
        cond = cond.add(Expr::col(Column::Occupancy).gte(Expr::col(Column::Capacity)));
    }
    if let Some(min) = filter.min_capacity {
        cond = cond.add(Column::Capacity.gte(i64::from(min)));
    }
    if let Some(max) = filter.max_capacity {
        cond = cond.add(Column::Capacity.lte(i64::from(max)));
    }
    if let Some(min) = filter.min_rent {
        cond = cond.add(Column::MonthlyRent.gte(min));
    }
    if let Some(max) = filter.max_rent {
        cond = cond.add(Column::MonthlyRent.lte(max));
    }
    if let Some(kw) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        cond = cond.add(
            Condition::any()
                .add(Column::BuildingName.contains(kw))
                .add(Column::RoomNumber.contains(kw))
                .add(Column::Description.contains(kw)),
        );
    }
    cond
}

#[async_trait]
impl RoomsRepository for OrmRoomsRepository {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Room>, DomainError> {
        let found = Entity::find_by_id(id).one(conn).await.map_err(db_err)?;
        found.map(room_from_model).transpose()
    }

    async fn get_for_update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Room>, DomainError> {
        // SELECT ... FOR UPDATE on Postgres. SQLite has no row locks; its
        // single writer lock plus the contention retry cover it there.
        let found = Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_err)?;
        found.map(room_from_model).transpose()
    }

    async fn find_by_location<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        building_name: &str,
        room_number: &str,
    ) -> Result<Option<Room>, DomainError> {
        let found = Entity::find()
            .filter(Column::BuildingName.eq(building_name))
            .filter(Column::RoomNumber.eq(room_number))
            .one(conn)
            .await
            .map_err(db_err)?;
        found.map(room_from_model).transpose()
    }

    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &RoomFilter,
    ) -> Result<Vec<Room>, DomainError> {
        Entity::find()
            .filter(filter_condition(filter))
            .order_by_asc(Column::BuildingName)
            .order_by_asc(Column::RoomNumber)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(room_from_model)
            .collect()
    }

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room: Room,
    ) -> Result<Room, DomainError> {
        let saved = room_to_active(room)?.insert(conn).await.map_err(db_err)?;
        room_from_model(saved)
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room: Room,
    ) -> Result<Room, DomainError> {
        let id = room.id;
        if Entity::find_by_id(id).one(conn).await.map_err(db_err)?.is_none() {
            return Err(DomainError::not_found("Room", id));
        }
        let saved = room_to_active(room)?.update(conn).await.map_err(db_err)?;
        room_from_model(saved)
    }

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = Entity::delete_by_id(id).exec(conn).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn location_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        building_name: &str,
        room_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let mut q = Entity::find()
            .filter(Column::BuildingName.eq(building_name))
            .filter(Column::RoomNumber.eq(room_number));
        if let Some(id) = exclude {
            q = q.filter(Column::Id.ne(id));
        }
        Ok(q.count(conn).await.map_err(db_err)? > 0)
    }
}
