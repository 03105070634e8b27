use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::error::DormitoryError;
use crate::contract::model::{
    Assignment, NewAssignment, NewRepairTicket, RepairTicket, Room, RoomFilter, User,
};

/// Public API trait for the dormitory module that other modules can use
#[async_trait]
pub trait DormitoryApi: Send + Sync {
    /// Verify credentials and return the user on success
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DormitoryError>;

    /// Get a user by ID
    async fn get_user(&self, id: Uuid) -> Result<User, DormitoryError>;

    /// Get a room by ID
    async fn get_room(&self, id: Uuid) -> Result<Room, DormitoryError>;

    /// List rooms matching the filter
    async fn list_rooms(&self, filter: RoomFilter) -> Result<Vec<Room>, DormitoryError>;

    /// Place a student into a room
    async fn assign_student(&self, new: NewAssignment) -> Result<Assignment, DormitoryError>;

    /// The student's current active assignment, if any
    async fn active_assignment(&self, student_id: Uuid)
        -> Result<Option<Assignment>, DormitoryError>;

    /// File a repair ticket on behalf of a student
    async fn submit_repair(&self, new: NewRepairTicket) -> Result<RepairTicket, DormitoryError>;

    /// Pending tickets, most urgent first
    async fn pending_repairs(&self) -> Result<Vec<RepairTicket>, DormitoryError>;
}
