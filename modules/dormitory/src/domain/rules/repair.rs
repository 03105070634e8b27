use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{RepairPriority, RepairStatus, RepairTicket};
use crate::domain::error::DomainError;

impl RepairPriority {
    /// Queue rank, 1 is served first.
    pub fn rank(self) -> u8 {
        match self {
            RepairPriority::Urgent => 1,
            RepairPriority::High => 2,
            RepairPriority::Medium => 3,
            RepairPriority::Low => 4,
        }
    }

    pub fn is_high(self) -> bool {
        self.rank() <= 2
    }
}

impl RepairStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RepairStatus::Completed | RepairStatus::Cancelled)
    }
}

impl RepairTicket {
    fn expect_status(&self, expected: RepairStatus, action: &str) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::invalid_state(
                "RepairTicket",
                format!(
                    "cannot {} ticket {} in status {}, expected {}",
                    action, self.id, self.status, expected
                ),
            ))
        }
    }

    /// Edits and deletion are only allowed before anyone picks the ticket up.
    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        self.expect_status(RepairStatus::Pending, "modify")
    }

    /// PENDING -> IN_PROGRESS. The caller has already checked the admin role.
    pub fn assign_to(&mut self, admin_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_status(RepairStatus::Pending, "assign")?;
        self.status = RepairStatus::InProgress;
        self.assigned_admin_id = Some(admin_id);
        self.assigned_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// IN_PROGRESS -> COMPLETED.
    pub fn complete(
        &mut self,
        notes: Option<String>,
        cost: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.expect_status(RepairStatus::InProgress, "complete")?;
        if let Some(cost) = cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(DomainError::validation("repair_cost", "must be a non-negative amount"));
            }
        }
        self.status = RepairStatus::Completed;
        self.completed_at = Some(now);
        self.admin_notes = notes;
        self.repair_cost = cost;
        self.updated_at = now;
        Ok(())
    }

    /// PENDING or IN_PROGRESS -> CANCELLED. The reason replaces the admin notes.
    pub fn cancel(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(
                "RepairTicket",
                format!("ticket {} is already {}", self.id, self.status),
            ));
        }
        self.status = RepairStatus::Cancelled;
        self.admin_notes = Some(reason.trim().to_string()).filter(|r| !r.is_empty());
        self.updated_at = now;
        Ok(())
    }
}

/// Fixed-rank ordering for the pending queue: URGENT, HIGH, MEDIUM, LOW, then
/// oldest request first. Stable, so equal keys keep their input order.
pub fn sort_pending_queue(tickets: &mut [RepairTicket]) {
    tickets.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then(a.requested_at.cmp(&b.requested_at))
    });
}
