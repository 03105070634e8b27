use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    NewRepairTicket, RepairFilter, RepairStatus, RepairTicket, RepairTicketPatch,
};
use crate::domain::error::DomainError;
use crate::domain::repos::{RepairsRepository, RoomsRepository, UsersRepository};
use crate::domain::rules::sort_pending_queue;

fn required_description(value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation("description", "cannot be empty"));
    }
    Ok(value.to_string())
}

/// Repair ticket intake and the PENDING -> IN_PROGRESS -> COMPLETED workflow.
pub struct RepairsService<TR, UR, RR> {
    tickets: Arc<TR>,
    users: Arc<UR>,
    rooms: Arc<RR>,
    db: DatabaseConnection,
}

impl<TR, UR, RR> RepairsService<TR, UR, RR>
where
    TR: RepairsRepository,
    UR: UsersRepository,
    RR: RoomsRepository,
{
    pub fn new(tickets: Arc<TR>, users: Arc<UR>, rooms: Arc<RR>, db: DatabaseConnection) -> Self {
        Self {
            tickets,
            users,
            rooms,
            db,
        }
    }

    #[instrument(name = "dormitory.service.repairs.get", skip(self), fields(ticket_id = %id))]
    pub async fn get_ticket(&self, id: Uuid) -> Result<RepairTicket, DomainError> {
        debug!("Getting repair ticket by id");
        self.tickets
            .get(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("RepairTicket", id))
    }

    #[instrument(name = "dormitory.service.repairs.list", skip(self))]
    pub async fn list_tickets(&self, filter: RepairFilter) -> Result<Vec<RepairTicket>, DomainError> {
        let found = self.tickets.list(&self.db, &filter).await?;
        debug!("Listed {} repair tickets", found.len());
        Ok(found)
    }

    async fn with_status(&self, status: RepairStatus) -> Result<Vec<RepairTicket>, DomainError> {
        let filter = RepairFilter {
            status: Some(status),
            ..RepairFilter::default()
        };
        self.tickets.list(&self.db, &filter).await
    }

    /// PENDING tickets in service order.
    #[instrument(name = "dormitory.service.repairs.pending_queue", skip(self))]
    pub async fn pending_queue(&self) -> Result<Vec<RepairTicket>, DomainError> {
        let mut queue = self.with_status(RepairStatus::Pending).await?;
        sort_pending_queue(&mut queue);
        debug!("{} tickets waiting", queue.len());
        Ok(queue)
    }

    /// URGENT and HIGH pending tickets, in queue order.
    #[instrument(name = "dormitory.service.repairs.high_priority_pending", skip(self))]
    pub async fn high_priority_pending(&self) -> Result<Vec<RepairTicket>, DomainError> {
        let mut queue = self.pending_queue().await?;
        queue.retain(|t| t.priority.is_high());
        Ok(queue)
    }

    /// Most recently picked up first.
    #[instrument(name = "dormitory.service.repairs.in_progress", skip(self))]
    pub async fn in_progress(&self) -> Result<Vec<RepairTicket>, DomainError> {
        let mut started = self.with_status(RepairStatus::InProgress).await?;
        started.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        Ok(started)
    }

    /// Open tickets requested at least `days` ago, oldest first.
    #[instrument(name = "dormitory.service.repairs.overdue", skip(self))]
    pub async fn overdue(&self, days: u32) -> Result<Vec<RepairTicket>, DomainError> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let mut open = self.with_status(RepairStatus::Pending).await?;
        open.extend(self.with_status(RepairStatus::InProgress).await?);
        open.retain(|t| t.requested_at <= cutoff);
        open.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        debug!("{} overdue tickets", open.len());
        Ok(open)
    }

    #[instrument(
        name = "dormitory.service.repairs.create",
        skip(self, new),
        fields(student_id = %new.student_id, room_id = %new.room_id, priority = %new.priority)
    )]
    pub async fn create_ticket(&self, new: NewRepairTicket) -> Result<RepairTicket, DomainError> {
        info!("Creating repair ticket");

        let description = required_description(&new.description)?;

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
        if self.rooms.get(&txn, new.room_id).await?.is_none() {
            return Err(DomainError::not_found("Room", new.room_id));
        }

        let now = Utc::now();
        let ticket = RepairTicket {
            id: Uuid::new_v4(),
            student_id: student.id,
            room_id: new.room_id,
            description,
            repair_type: new.repair_type,
            status: RepairStatus::Pending,
            priority: new.priority,
            assigned_admin_id: None,
            admin_notes: None,
            repair_cost: None,
            requested_at: now,
            assigned_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let ticket = self.tickets.create(&txn, ticket).await?;
        txn.commit().await?;

        info!("Successfully created repair ticket with id={}", ticket.id);
        Ok(ticket)
    }

    #[instrument(name = "dormitory.service.repairs.update", skip(self, patch), fields(ticket_id = %id))]
    pub async fn update_ticket(
        &self,
        id: Uuid,
        patch: RepairTicketPatch,
    ) -> Result<RepairTicket, DomainError> {
        info!("Updating repair ticket");

        let txn = self.db.begin().await?;
        let mut ticket = self.load(&txn, id).await?;
        ticket.ensure_editable()?;

        if let Some(description) = patch.description {
            ticket.description = required_description(&description)?;
        }
        if let Some(repair_type) = patch.repair_type {
            ticket.repair_type = repair_type;
        }
        if let Some(priority) = patch.priority {
            ticket.priority = priority;
        }
        ticket.updated_at = Utc::now();

        let ticket = self.tickets.update(&txn, ticket).await?;
        txn.commit().await?;
        Ok(ticket)
    }

    #[instrument(name = "dormitory.service.repairs.delete", skip(self), fields(ticket_id = %id))]
    pub async fn delete_ticket(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting repair ticket");

        let txn = self.db.begin().await?;
        self.load(&txn, id).await?.ensure_editable()?;
        self.tickets.delete(&txn, id).await?;
        txn.commit().await?;
        Ok(())
    }

    #[instrument(
        name = "dormitory.service.repairs.assign",
        skip(self),
        fields(ticket_id = %id, admin_id = %admin_id)
    )]
    pub async fn assign(&self, id: Uuid, admin_id: Uuid) -> Result<RepairTicket, DomainError> {
        info!("Assigning repair ticket");

        let txn = self.db.begin().await?;
        let mut ticket = self.load(&txn, id).await?;

        let admin = self
            .users
            .get(&txn, admin_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", admin_id))?;
        if !admin.is_admin() {
            return Err(DomainError::rejected(format!(
                "user '{}' is not an admin",
                admin.username
            )));
        }

        ticket.assign_to(admin.id, Utc::now())?;
        let ticket = self.tickets.update(&txn, ticket).await?;
        txn.commit().await?;

        info!("Repair ticket in progress");
        Ok(ticket)
    }

    #[instrument(name = "dormitory.service.repairs.complete", skip(self, notes), fields(ticket_id = %id))]
    pub async fn complete(
        &self,
        id: Uuid,
        notes: Option<String>,
        cost: Option<f64>,
    ) -> Result<RepairTicket, DomainError> {
        info!("Completing repair ticket");

        let txn = self.db.begin().await?;
        let mut ticket = self.load(&txn, id).await?;
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        ticket.complete(notes, cost, Utc::now())?;
        let ticket = self.tickets.update(&txn, ticket).await?;
        txn.commit().await?;

        info!("Repair ticket completed");
        Ok(ticket)
    }

    #[instrument(name = "dormitory.service.repairs.cancel", skip(self, reason), fields(ticket_id = %id))]
    pub async fn cancel(&self, id: Uuid, reason: &str) -> Result<RepairTicket, DomainError> {
        info!("Cancelling repair ticket");

        let txn = self.db.begin().await?;
        let mut ticket = self.load(&txn, id).await?;
        ticket.cancel(reason, Utc::now())?;
        let ticket = self.tickets.update(&txn, ticket).await?;
        txn.commit().await?;

        info!("Repair ticket cancelled");
        Ok(ticket)
    }

    async fn load<C>(&self, conn: &C, id: Uuid) -> Result<RepairTicket, DomainError>
    where
        C: sea_orm::ConnectionTrait + Send + Sync,
    {
        self.tickets
            .get(conn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("RepairTicket", id))
    }
}
