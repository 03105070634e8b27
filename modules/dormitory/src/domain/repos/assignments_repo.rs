use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::contract::model::{Assignment, AssignmentFilter};
use crate::domain::error::DomainError;

#[async_trait]
pub trait AssignmentsRepository: Send + Sync {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Assignment>, DomainError>;

    async fn active_for_student<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_id: Uuid,
    ) -> Result<Option<Assignment>, DomainError>;

    async fn active_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<Vec<Assignment>, DomainError>;

    async fn count_active_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<u64, DomainError>;

    /// Ids of every student holding an ACTIVE assignment.
    async fn active_student_ids<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Vec<Uuid>, DomainError>;

    /// Newest check-in first. `today` anchors `long_term_days`.
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &AssignmentFilter,
        today: NaiveDate,
    ) -> Result<Vec<Assignment>, DomainError>;

    /// Any status; used to block deletes of referenced rows.
    async fn count_for_room<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        room_id: Uuid,
    ) -> Result<u64, DomainError>;

    async fn count_for_student<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_id: Uuid,
    ) -> Result<u64, DomainError>;

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        assignment: Assignment,
    ) -> Result<Assignment, DomainError>;

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        assignment: Assignment,
    ) -> Result<Assignment, DomainError>;
}
