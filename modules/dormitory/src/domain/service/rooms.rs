use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewRoom, Room, RoomFilter, RoomPatch, RoomStatus};
use crate::domain::error::DomainError;
use crate::domain::repos::{AssignmentsRepository, RepairsRepository, RoomsRepository};
use crate::domain::rules::user::normalize_optional;
use crate::domain::service::retry_on_contention;

fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, "cannot be empty"));
    }
    Ok(value.to_string())
}

fn check_rent(rent: Option<f64>) -> Result<(), DomainError> {
    match rent {
        Some(r) if !r.is_finite() || r < 0.0 => Err(DomainError::validation(
            "monthly_rent",
            "must be a non-negative amount",
        )),
        _ => Ok(()),
    }
}

/// Room inventory. Occupancy is never written here directly; it only moves
/// through assignment operations.
pub struct RoomsService<RR, AR, TR> {
    rooms: Arc<RR>,
    assignments: Arc<AR>,
    repairs: Arc<TR>,
    db: DatabaseConnection,
}

impl<RR, AR, TR> RoomsService<RR, AR, TR>
where
    RR: RoomsRepository,
    AR: AssignmentsRepository,
    TR: RepairsRepository,
{
    pub fn new(rooms: Arc<RR>, assignments: Arc<AR>, repairs: Arc<TR>, db: DatabaseConnection) -> Self {
        Self {
            rooms,
            assignments,
            repairs,
            db,
        }
    }

    #[instrument(name = "dormitory.service.rooms.get", skip(self), fields(room_id = %id))]
    pub async fn get_room(&self, id: Uuid) -> Result<Room, DomainError> {
        debug!("Getting room by id");
        self.rooms
            .get(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", id))
    }

    #[instrument(name = "dormitory.service.rooms.find_by_location", skip(self))]
    pub async fn find_by_location(
        &self,
        building_name: &str,
        room_number: &str,
    ) -> Result<Room, DomainError> {
        let (building_name, room_number) = (building_name.trim(), room_number.trim());
        self.rooms
            .find_by_location(&self.db, building_name, room_number)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", format!("{building_name}-{room_number}")))
    }

    #[instrument(name = "dormitory.service.rooms.list", skip(self))]
    pub async fn list_rooms(&self, filter: RoomFilter) -> Result<Vec<Room>, DomainError> {
        let rooms = self.rooms.list(&self.db, &filter).await?;
        debug!("Listed {} rooms", rooms.len());
        Ok(rooms)
    }

    pub async fn available_rooms(&self) -> Result<Vec<Room>, DomainError> {
        self.list_rooms(RoomFilter {
            available_only: true,
            ..RoomFilter::default()
        })
        .await
    }

    #[instrument(
        name = "dormitory.service.rooms.create",
        skip(self, new_room),
        fields(building = %new_room.building_name, room_number = %new_room.room_number)
    )]
    pub async fn create_room(&self, new_room: NewRoom) -> Result<Room, DomainError> {
        info!("Creating new room");

        let building_name = required("building_name", &new_room.building_name)?;
        let room_number = required("room_number", &new_room.room_number)?;
        if new_room.capacity == 0 {
            return Err(DomainError::validation("capacity", "must be greater than zero"));
        }
        check_rent(new_room.monthly_rent)?;
        let status = new_room.status.unwrap_or(RoomStatus::Available);
        if !status.is_manual() {
            return Err(DomainError::validation(
                "status",
                "a new room cannot start as FULL",
            ));
        }

        let txn = self.db.begin().await?;
        if self
            .rooms
            .location_taken(&txn, &building_name, &room_number, None)
            .await?
        {
            return Err(DomainError::already_exists(
                "Room",
                "location",
                format!("{building_name}-{room_number}"),
            ));
        }

        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            building_name,
            room_number,
            capacity: new_room.capacity,
            occupancy: 0,
            room_type: new_room.room_type,
            status,
            monthly_rent: new_room.monthly_rent,
            description: normalize_optional(new_room.description),
            created_at: now,
            updated_at: now,
        };
        let room = self.rooms.create(&txn, room).await?;
        txn.commit().await?;

        info!("Successfully created room with id={}", room.id);
        Ok(room)
    }

    #[instrument(name = "dormitory.service.rooms.update", skip(self, patch), fields(room_id = %id))]
    pub async fn update_room(&self, id: Uuid, patch: RoomPatch) -> Result<Room, DomainError> {
        info!("Updating room");

        let patch = &patch;
        let room = retry_on_contention(move || self.try_update_room(id, patch)).await?;

        info!(status = %room.status, "Successfully updated room");
        Ok(room)
    }

    async fn try_update_room(&self, id: Uuid, patch: &RoomPatch) -> Result<Room, DomainError> {
        let txn = self.db.begin().await?;
        // Locked so a concurrent assignment cannot slip in under a capacity cut.
        let mut room = self
            .rooms
            .get_for_update(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", id))?;

        if patch.building_name.is_some() || patch.room_number.is_some() {
            let building_name = match &patch.building_name {
                Some(b) => required("building_name", b)?,
                None => room.building_name.clone(),
            };
            let room_number = match &patch.room_number {
                Some(n) => required("room_number", n)?,
                None => room.room_number.clone(),
            };
            let moved = building_name != room.building_name || room_number != room.room_number;
            if moved
                && self
                    .rooms
                    .location_taken(&txn, &building_name, &room_number, Some(id))
                    .await?
            {
                return Err(DomainError::already_exists(
                    "Room",
                    "location",
                    format!("{building_name}-{room_number}"),
                ));
            }
            room.building_name = building_name;
            room.room_number = room_number;
        }
        if let Some(capacity) = patch.capacity {
            room.set_capacity(capacity)?;
        }
        if let Some(room_type) = patch.room_type {
            room.room_type = room_type;
        }
        if let Some(status) = patch.status {
            room.set_manual_status(status)?;
        }
        if patch.monthly_rent.is_some() {
            check_rent(patch.monthly_rent)?;
            room.monthly_rent = patch.monthly_rent;
        }
        if patch.description.is_some() {
            room.description = normalize_optional(patch.description.clone());
        }
        room.reconcile_status();
        room.updated_at = Utc::now();

        let room = self.rooms.update(&txn, room).await?;
        txn.commit().await?;
        Ok(room)
    }

    #[instrument(name = "dormitory.service.rooms.delete", skip(self), fields(room_id = %id))]
    pub async fn delete_room(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting room");

        let txn = self.db.begin().await?;
        let room = self
            .rooms
            .get_for_update(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", id))?;
        if room.occupancy > 0 {
            return Err(DomainError::rejected(format!(
                "room {}-{} still has {} occupant(s)",
                room.building_name, room.room_number, room.occupancy
            )));
        }
        let assignments = self.assignments.count_for_room(&txn, id).await?;
        let tickets = self.repairs.count_for_room(&txn, id).await?;
        if assignments > 0 || tickets > 0 {
            return Err(DomainError::rejected(format!(
                "room is referenced by {assignments} assignment(s) and {tickets} repair ticket(s)"
            )));
        }

        self.rooms.delete(&txn, id).await?;
        txn.commit().await?;

        info!("Successfully deleted room");
        Ok(())
    }
}
