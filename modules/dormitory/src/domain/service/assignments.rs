use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    Assignment, AssignmentFilter, AssignmentStatus, NewAssignment, Room,
};
use crate::domain::error::DomainError;
use crate::domain::repos::{AssignmentsRepository, RoomsRepository, UsersRepository};
use crate::domain::service::retry_on_contention;

/// Student placement. Owns every occupancy change: assign adds one, check-out
/// and cancel remove one, always in the same transaction as the assignment row.
pub struct AssignmentsService<AR, UR, RR> {
    assignments: Arc<AR>,
    users: Arc<UR>,
    rooms: Arc<RR>,
    db: DatabaseConnection,
}

impl<AR, UR, RR> AssignmentsService<AR, UR, RR>
where
    AR: AssignmentsRepository,
    UR: UsersRepository,
    RR: RoomsRepository,
{
    pub fn new(assignments: Arc<AR>, users: Arc<UR>, rooms: Arc<RR>, db: DatabaseConnection) -> Self {
        Self {
            assignments,
            users,
            rooms,
            db,
        }
    }

    #[instrument(name = "dormitory.service.assignments.get", skip(self), fields(assignment_id = %id))]
    pub async fn get_assignment(&self, id: Uuid) -> Result<Assignment, DomainError> {
        debug!("Getting assignment by id");
        self.assignments
            .get(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Assignment", id))
    }

    #[instrument(name = "dormitory.service.assignments.active_for_student", skip(self))]
    pub async fn active_for_student(&self, student_id: Uuid) -> Result<Option<Assignment>, DomainError> {
        self.assignments.active_for_student(&self.db, student_id).await
    }

    #[instrument(name = "dormitory.service.assignments.active_for_room", skip(self))]
    pub async fn active_for_room(&self, room_id: Uuid) -> Result<Vec<Assignment>, DomainError> {
        self.assignments.active_for_room(&self.db, room_id).await
    }

    #[instrument(name = "dormitory.service.assignments.list", skip(self))]
    pub async fn list_assignments(&self, filter: AssignmentFilter) -> Result<Vec<Assignment>, DomainError> {
        let today = Utc::now().date_naive();
        let found = self.assignments.list(&self.db, &filter, today).await?;
        debug!("Listed {} assignments", found.len());
        Ok(found)
    }

    #[instrument(
        name = "dormitory.service.assignments.assign",
        skip(self, new),
        fields(student_id = %new.student_id, room_id = %new.room_id)
    )]
    pub async fn assign(&self, new: NewAssignment) -> Result<Assignment, DomainError> {
        info!("Assigning student to room");

        if let Some(fee) = new.monthly_fee {
            if !fee.is_finite() || fee < 0.0 {
                return Err(DomainError::validation("monthly_fee", "must be a non-negative amount"));
            }
        }

        let new = &new;
        let (assignment, room) = retry_on_contention(move || self.try_assign(new)).await?;

        info!(
            assignment_id = %assignment.id,
            occupancy = room.occupancy,
            status = %room.status,
            "Student assigned"
        );
        Ok(assignment)
    }

    async fn try_assign(&self, new: &NewAssignment) -> Result<(Assignment, Room), DomainError> {
        let txn = self.db.begin().await?;

        let student = self
            .users
            .get(&txn, new.student_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", new.student_id))?;
        if !student.is_student() {
            return Err(DomainError::rejected(format!(
                "user '{}' is not a student",
                student.username
            )));
        }

        // Everything below runs while holding the room lock.
        let mut room = self.lock_room(&txn, new.room_id).await?;
        if let Some(active) = self.assignments.active_for_student(&txn, student.id).await? {
            return Err(DomainError::rejected(format!(
                "student '{}' already has active assignment {}",
                student.username, active.id
            )));
        }
        if !room.is_available() {
            return Err(DomainError::rejected(format!(
                "room {}-{} is not available (status {}, {}/{})",
                room.building_name, room.room_number, room.status, room.occupancy, room.capacity
            )));
        }
        // The row count is authoritative over the cached counter.
        let active = self.assignments.count_active_for_room(&txn, room.id).await?;
        if active >= u64::from(room.capacity) {
            return Err(DomainError::rejected(format!(
                "room {}-{} is full",
                room.building_name, room.room_number
            )));
        }

        let now = Utc::now();
        room.apply_occupancy_change(1, now)?;
        let assignment = Assignment {
            id: Uuid::new_v4(),
            student_id: student.id,
            room_id: room.id,
            check_in_date: new.check_in_date,
            check_out_date: None,
            status: AssignmentStatus::Active,
            monthly_fee: new.monthly_fee.or(room.monthly_rent),
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let assignment = self.assignments.create(&txn, assignment).await?;
        let room = self.rooms.update(&txn, room).await?;
        txn.commit().await?;
        Ok((assignment, room))
    }

    #[instrument(name = "dormitory.service.assignments.check_out", skip(self), fields(student_id = %student_id))]
    pub async fn check_out(&self, student_id: Uuid, date: NaiveDate) -> Result<Assignment, DomainError> {
        info!("Checking student out");

        let (assignment, room) =
            retry_on_contention(move || self.try_check_out(student_id, date)).await?;

        info!(
            assignment_id = %assignment.id,
            occupancy = room.occupancy,
            status = %room.status,
            "Student checked out"
        );
        Ok(assignment)
    }

    async fn try_check_out(
        &self,
        student_id: Uuid,
        date: NaiveDate,
    ) -> Result<(Assignment, Room), DomainError> {
        let not_found = || DomainError::not_found("Assignment", format!("active for student {student_id}"));

        let txn = self.db.begin().await?;
        let seen = self
            .assignments
            .active_for_student(&txn, student_id)
            .await?
            .ok_or_else(not_found)?;
        let room = self.lock_room(&txn, seen.room_id).await?;

        // Re-read under the lock: a concurrent check-out may have closed it.
        let mut assignment = self
            .assignments
            .active_for_student(&txn, student_id)
            .await?
            .ok_or_else(not_found)?;
        if assignment.room_id != room.id {
            return Err(DomainError::contention("active assignment moved to another room"));
        }

        let now = Utc::now();
        assignment.check_out(date, now)?;
        let room = self.release_bed(&txn, room).await?;
        let assignment = self.assignments.update(&txn, assignment).await?;
        txn.commit().await?;
        Ok((assignment, room))
    }

    #[instrument(name = "dormitory.service.assignments.cancel", skip(self, reason), fields(assignment_id = %id))]
    pub async fn cancel(&self, id: Uuid, reason: &str) -> Result<Assignment, DomainError> {
        info!("Cancelling assignment");

        let (assignment, room) = retry_on_contention(move || self.try_cancel(id, reason)).await?;

        info!(occupancy = room.occupancy, status = %room.status, "Assignment cancelled");
        Ok(assignment)
    }

    async fn try_cancel(&self, id: Uuid, reason: &str) -> Result<(Assignment, Room), DomainError> {
        let txn = self.db.begin().await?;
        let seen = self
            .assignments
            .get(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Assignment", id))?;
        let room = self.lock_room(&txn, seen.room_id).await?;

        let mut assignment = self
            .assignments
            .get(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Assignment", id))?;
        assignment.cancel(reason, Utc::now())?;
        let room = self.release_bed(&txn, room).await?;
        let assignment = self.assignments.update(&txn, assignment).await?;
        txn.commit().await?;
        Ok((assignment, room))
    }

    async fn lock_room<C>(&self, conn: &C, room_id: Uuid) -> Result<Room, DomainError>
    where
        C: sea_orm::ConnectionTrait + Send + Sync,
    {
        self.rooms
            .get_for_update(conn, room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))
    }

    /// `room` must have been loaded through [`Self::lock_room`] in the same transaction.
    async fn release_bed<C>(&self, conn: &C, mut room: Room) -> Result<Room, DomainError>
    where
        C: sea_orm::ConnectionTrait + Send + Sync,
    {
        room.apply_occupancy_change(-1, Utc::now())?;
        self.rooms.update(conn, room).await
    }
}
