use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::contract::model::{RepairFilter, RepairTicket};
use crate::domain::error::DomainError;
use crate::domain::repos::RepairsRepository;
use crate::infra::storage::db_err;
use crate::infra::storage::entity::repair_ticket::{Column, Entity};
use crate::infra::storage::mapper::{ticket_from_model, ticket_to_active};

/// ORM-based implementation of the `RepairsRepository` trait.
#[derive(Clone, Default)]
pub struct OrmRepairsRepository;

impl OrmRepairsRepository {
    pub fn new() -> Self {
        Self
    }
}

fn filter_condition(filter: &RepairFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(student_id) = filter.student_id {
        cond = cond.add(Column::StudentId.eq(student_id));
    }
    if let Some(room_id) = filter.room_id {
        cond = cond.add(Column::RoomId.eq(room_id));
    }
    if let Some(status) = filter.status {
        cond = cond.add(Column::Status.eq(status.as_str()));
    }
    if let Some(repair_type) = filter.repair_type {
        cond = cond.add(Column::RepairType.eq(repair_type.as_str()));
    }
    if let Some(priority) = filter.priority {
        cond = cond.add(Column::Priority.eq(priority.as_str()));
    }
    if let Some(from) = filter.requested_from {
        cond = cond.add(Column::RequestedAt.gte(from));
    }
    if let Some(to) = filter.requested_to {
        cond = cond.add(Column::RequestedAt.lte(to));
    }
    if let Some(kw) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        cond = cond.add(
            Condition::any()
                .add(Column::Description.contains(kw))
                .add(Column::AdminNotes.contains(kw)),
        );
    }
    cond
}

#[async_trait]
impl RepairsRepository for OrmRepairsRepository {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<RepairTicket>, DomainError> {
        let found = Entity::find_by_id(id).one(conn).await.map_err(db_err)?;
        found.map(ticket_from_model).transpose()
    }

    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &RepairFilter,
    ) -> Result<Vec<RepairTicket>, DomainError> {
        Entity::find()
            .filter(filter_condition(filter))
            .order_by_desc(Column::RequestedAt)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(ticket_from_model)
            .collect()
    }

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ticket: RepairTicket,
    ) -> Result<RepairTicket, DomainError> {
        let saved = ticket_to_active(ticket).insert(conn).await.map_err(db_err)?;
        ticket_from_model(saved)
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ticket: RepairTicket,
    ) -> Result<RepairTicket, DomainError> {
        let id = ticket.id;
        if Entity::find_by_id(id).one(conn).await.map_err(db_err)?.is_none() {
            return Err(DomainError::not_found("RepairTicket", id));
        }
        let saved = ticket_to_active(ticket).update(conn).await.map_err(db_err)?;
        ticket_from_model(saved)
    }

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = Entity::delete_by_id(id).exec(conn).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn count_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<u64, DomainError> {
        Entity::find()
            .filter(Column::RoomId.eq(room_id))
            .count(conn)
            .await
            .map_err(db_err)
    }

    async fn count_for_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<u64, DomainError> {
        Entity::find()
            .filter(
                Condition::any()
                    .add(Column::StudentId.eq(user_id))
                    .add(Column::AssignedAdminId.eq(user_id)),
            )
            .count(conn)
            .await
            .map_err(db_err)
    }
}
