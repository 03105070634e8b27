use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::{Assignment, AssignmentFilter, AssignmentStatus};
use crate::domain::error::DomainError;
use crate::domain::repos::AssignmentsRepository;
use crate::infra::storage::db_err;
use crate::infra::storage::entity::assignment::{Column, Entity};
use crate::infra::storage::mapper::{assignment_from_model, assignment_to_active};

fn active() -> &'static str {
    AssignmentStatus::Active.as_str()
}

/// ORM-based implementation of the `AssignmentsRepository` trait.
#[derive(Clone, Default)]
pub struct OrmAssignmentsRepository;

impl OrmAssignmentsRepository {
    pub fn new() -> Self {
        Self
    }
}

fn filter_condition(filter: &AssignmentFilter, today: NaiveDate) -> Condition {
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
    if let Some(from) = filter.check_in_from {
        cond = cond.add(Column::CheckInDate.gte(from));
    }
    if let Some(to) = filter.check_in_to {
        cond = cond.add(Column::CheckInDate.lte(to));
    }
    if let Some(from) = filter.check_out_from {
        cond = cond.add(Column::CheckOutDate.gte(from));
    }
    if let Some(to) = filter.check_out_to {
        cond = cond.add(Column::CheckOutDate.lte(to));
    }
    if let Some(days) = filter.long_term_days {
        let cutoff = today - Duration::days(i64::from(days));
        cond = cond
            .add(Column::Status.eq(active()))
            .add(Column::CheckInDate.lte(cutoff));
    }
    cond
}

#[async_trait]
impl AssignmentsRepository for OrmAssignmentsRepository {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Assignment>, DomainError> {
        let found = Entity::find_by_id(id).one(conn).await.map_err(db_err)?;
        found.map(assignment_from_model).transpose()
    }

    async fn active_for_student<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_id: Uuid,
    ) -> Result<Option<Assignment>, DomainError> {
        let found = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(active()))
            .one(conn)
            .await
            .map_err(db_err)?;
        found.map(assignment_from_model).transpose()
    }

    async fn active_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<Vec<Assignment>, DomainError> {
        Entity::find()
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::Status.eq(active()))
            .order_by_asc(Column::CheckInDate)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(assignment_from_model)
            .collect()
    }

    async fn count_active_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<u64, DomainError> {
        Entity::find()
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::Status.eq(active()))
            .count(conn)
            .await
            .map_err(db_err)
    }

    async fn active_student_ids<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Vec<Uuid>, DomainError> {
        Entity::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::Status.eq(active()))
            .into_tuple::<Uuid>()
            .all(conn)
            .await
            .map_err(db_err)
    }

    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &AssignmentFilter,
        today: NaiveDate,
    ) -> Result<Vec<Assignment>, DomainError> {
        Entity::find()
            .filter(filter_condition(filter, today))
            .order_by_desc(Column::CheckInDate)
            .order_by_desc(Column::CreatedAt)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(assignment_from_model)
            .collect()
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

    async fn count_for_student<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_id: Uuid,
    ) -> Result<u64, DomainError> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .count(conn)
            .await
            .map_err(db_err)
    }

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        assignment: Assignment,
    ) -> Result<Assignment, DomainError> {
        let student_id = assignment.student_id;
        let saved = assignment_to_active(assignment)
            .insert(conn)
            .await
            .map_err(|e| match e.sql_err() {
                // idx_assignments_one_active: a concurrent assign for the same
                // student committed first.
                Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::rejected(format!(
                    "student {student_id} already has an active assignment"
                )),
                _ => db_err(e),
            })?;
        assignment_from_model(saved)
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        assignment: Assignment,
    ) -> Result<Assignment, DomainError> {
        let id = assignment.id;
        if Entity::find_by_id(id).one(conn).await.map_err(db_err)?.is_none() {
            return Err(DomainError::not_found("Assignment", id));
        }
        let saved = assignment_to_active(assignment)
            .update(conn)
            .await
            .map_err(db_err)?;
        assignment_from_model(saved)
    }
}
