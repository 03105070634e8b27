use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::DormitoryApi,
    error::DormitoryError,
    model::{Assignment, NewAssignment, NewRepairTicket, RepairTicket, Room, RoomFilter, User},
};
use crate::module::ConcreteAppServices;

/// Local implementation of the DormitoryApi trait that delegates to the domain services
pub struct DormitoryLocalClient {
    services: Arc<ConcreteAppServices>,
}

impl DormitoryLocalClient {
    pub fn new(services: Arc<ConcreteAppServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl DormitoryApi for DormitoryLocalClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DormitoryError> {
        Ok(self.services.users.authenticate(username, password).await?)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, DormitoryError> {
        Ok(self.services.users.get_user(id).await?)
    }

    async fn get_room(&self, id: Uuid) -> Result<Room, DormitoryError> {
        Ok(self.services.rooms.get_room(id).await?)
    }

    async fn list_rooms(&self, filter: RoomFilter) -> Result<Vec<Room>, DormitoryError> {
        Ok(self.services.rooms.list_rooms(filter).await?)
    }

    async fn assign_student(&self, new: NewAssignment) -> Result<Assignment, DormitoryError> {
        Ok(self.services.assignments.assign(new).await?)
    }

    async fn active_assignment(
        &self,
        student_id: Uuid,
    ) -> Result<Option<Assignment>, DormitoryError> {
        Ok(self.services.assignments.active_for_student(student_id).await?)
    }

    async fn submit_repair(&self, new: NewRepairTicket) -> Result<RepairTicket, DormitoryError> {
        Ok(self.services.repairs.create_ticket(new).await?)
    }

    async fn pending_repairs(&self) -> Result<Vec<RepairTicket>, DormitoryError> {
        Ok(self.services.repairs.pending_queue().await?)
    }
}
