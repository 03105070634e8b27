use chrono::{DateTime, Utc};

use crate::contract::model::{Room, RoomStatus};
use crate::domain::error::DomainError;

impl RoomStatus {
    /// Statuses an operator may set by hand. `Full` is always derived.
    pub fn is_manual(self) -> bool {
        !matches!(self, RoomStatus::Full)
    }

    fn is_override(self) -> bool {
        matches!(self, RoomStatus::Maintenance | RoomStatus::Closed)
    }
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }

    /// Open for new assignments.
    pub fn is_available(&self) -> bool {
        self.status == RoomStatus::Available && !self.is_full()
    }

    pub fn free_beds(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    /// Derive AVAILABLE/FULL from occupancy. MAINTENANCE and CLOSED stick.
    pub fn reconcile_status(&mut self) {
        if self.status.is_override() {
            return;
        }
        self.status = if self.is_full() {
            RoomStatus::Full
        } else {
            RoomStatus::Available
        };
    }

    /// The only place occupancy changes. Out-of-range results are errors,
    /// never clamped.
    pub fn apply_occupancy_change(
        &mut self,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let next = i64::from(self.occupancy) + delta;
        if next < 0 || next > i64::from(self.capacity) {
            return Err(DomainError::invalid_state(
                "Room",
                format!(
                    "occupancy {} {:+} leaves range 0..={} for {}-{}",
                    self.occupancy, delta, self.capacity, self.building_name, self.room_number
                ),
            ));
        }
        self.occupancy = next as u32;
        self.reconcile_status();
        self.updated_at = now;
        Ok(())
    }

    /// Manual status change requested by an operator.
    pub fn set_manual_status(&mut self, status: RoomStatus) -> Result<(), DomainError> {
        if !status.is_manual() {
            return Err(DomainError::validation(
                "status",
                "FULL is derived from occupancy and cannot be set directly",
            ));
        }
        self.status = status;
        self.reconcile_status();
        Ok(())
    }

    pub fn set_capacity(&mut self, capacity: u32) -> Result<(), DomainError> {
        if capacity == 0 {
            return Err(DomainError::validation("capacity", "must be greater than zero"));
        }
        if capacity < self.occupancy {
            return Err(DomainError::rejected(format!(
                "capacity {} is below current occupancy {}",
                capacity, self.occupancy
            )));
        }
        self.capacity = capacity;
        self.reconcile_status();
        Ok(())
    }
}
