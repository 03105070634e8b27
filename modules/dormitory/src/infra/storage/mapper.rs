use std::str::FromStr;

use sea_orm::Set;

use crate::contract::model::{
    Assignment, RepairTicket, Role, Room, User, UserProfile,
};
use crate::domain::error::DomainError;
use crate::infra::storage::entity::{assignment, repair_ticket, room, user};

fn parse_label<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|e| DomainError::database(format!("corrupt {column} column: {e}")))
}

fn to_u32(column: &str, raw: i32) -> Result<u32, DomainError> {
    u32::try_from(raw).map_err(|_| DomainError::database(format!("negative {column}: {raw}")))
}

fn to_i32(column: &str, raw: u32) -> Result<i32, DomainError> {
    i32::try_from(raw).map_err(|_| DomainError::validation(column, format!("{raw} is too large")))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub fn user_from_model(m: user::Model) -> Result<User, DomainError> {
    let profile = match parse_label::<Role>("role", &m.role)? {
        Role::Student => UserProfile::Student {
            student_number: m.student_number.ok_or_else(|| {
                DomainError::database(format!("student {} has no student_number", m.id))
            })?,
            class_name: m.class_name,
            major: m.major,
        },
        Role::Admin => UserProfile::Admin {
            department: m.department,
            position: m.position,
        },
    };
    Ok(User {
        id: m.id,
        username: m.username,
        real_name: m.real_name,
        email: m.email,
        phone: m.phone,
        profile,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

/// Every column except `password_hash`, which callers set separately.
pub fn user_to_active(u: User) -> user::ActiveModel {
    let role = u.role().as_str().to_string();
    let (student_number, class_name, major, department, position) = match u.profile {
        UserProfile::Student {
            student_number,
            class_name,
            major,
        } => (Some(student_number), class_name, major, None, None),
        UserProfile::Admin {
            department,
            position,
        } => (None, None, None, department, position),
    };
    user::ActiveModel {
        id: Set(u.id),
        username: Set(u.username),
        real_name: Set(u.real_name),
        email: Set(u.email),
        phone: Set(u.phone),
        role: Set(role),
        student_number: Set(student_number),
        class_name: Set(class_name),
        major: Set(major),
        department: Set(department),
        position: Set(position),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

pub fn room_from_model(m: room::Model) -> Result<Room, DomainError> {
    Ok(Room {
        id: m.id,
        building_name: m.building_name,
        room_number: m.room_number,
        capacity: to_u32("capacity", m.capacity)?,
        occupancy: to_u32("occupancy", m.occupancy)?,
        room_type: parse_label("room_type", &m.room_type)?,
        status: parse_label("status", &m.status)?,
        monthly_rent: m.monthly_rent,
        description: m.description,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn room_to_active(r: Room) -> Result<room::ActiveModel, DomainError> {
    Ok(room::ActiveModel {
        id: Set(r.id),
        building_name: Set(r.building_name),
        room_number: Set(r.room_number),
        capacity: Set(to_i32("capacity", r.capacity)?),
        occupancy: Set(to_i32("occupancy", r.occupancy)?),
        room_type: Set(r.room_type.as_str().to_string()),
        status: Set(r.status.as_str().to_string()),
        monthly_rent: Set(r.monthly_rent),
        description: Set(r.description),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    })
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

pub fn assignment_from_model(m: assignment::Model) -> Result<Assignment, DomainError> {
    Ok(Assignment {
        id: m.id,
        student_id: m.student_id,
        room_id: m.room_id,
        check_in_date: m.check_in_date,
        check_out_date: m.check_out_date,
        status: parse_label("status", &m.status)?,
        monthly_fee: m.monthly_fee,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn assignment_to_active(a: Assignment) -> assignment::ActiveModel {
    assignment::ActiveModel {
        id: Set(a.id),
        student_id: Set(a.student_id),
        room_id: Set(a.room_id),
        check_in_date: Set(a.check_in_date),
        check_out_date: Set(a.check_out_date),
        status: Set(a.status.as_str().to_string()),
        monthly_fee: Set(a.monthly_fee),
        notes: Set(a.notes),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    }
}

// ---------------------------------------------------------------------------
// Repair tickets
// ---------------------------------------------------------------------------

pub fn ticket_from_model(m: repair_ticket::Model) -> Result<RepairTicket, DomainError> {
    Ok(RepairTicket {
        id: m.id,
        student_id: m.student_id,
        room_id: m.room_id,
        description: m.description,
        repair_type: parse_label("repair_type", &m.repair_type)?,
        status: parse_label("status", &m.status)?,
        priority: parse_label("priority", &m.priority)?,
        assigned_admin_id: m.assigned_admin_id,
        admin_notes: m.admin_notes,
        repair_cost: m.repair_cost,
        requested_at: m.requested_at,
        assigned_at: m.assigned_at,
        completed_at: m.completed_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn ticket_to_active(t: RepairTicket) -> repair_ticket::ActiveModel {
    repair_ticket::ActiveModel {
        id: Set(t.id),
        student_id: Set(t.student_id),
        room_id: Set(t.room_id),
        description: Set(t.description),
        repair_type: Set(t.repair_type.as_str().to_string()),
        status: Set(t.status.as_str().to_string()),
        priority: Set(t.priority.as_str().to_string()),
        assigned_admin_id: Set(t.assigned_admin_id),
        admin_notes: Set(t.admin_notes),
        repair_cost: Set(t.repair_cost),
        requested_at: Set(t.requested_at),
        assigned_at: Set(t.assigned_at),
        completed_at: Set(t.completed_at),
        created_at: Set(t.created_at),
        updated_at: Set(t.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(role: &str, student_number: Option<&str>) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            username: "bob".into(),
            password_hash: "$argon2id$...".into(),
            real_name: "Bob".into(),
            email: None,
            phone: None,
            role: role.into(),
            student_number: student_number.map(Into::into),
            class_name: Some("CS-2".into()),
            major: None,
            department: Some("stray".into()),
            position: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn student_row_ignores_admin_columns() {
        let u = user_from_model(row("STUDENT", Some("2024002"))).unwrap();
        assert_eq!(
            u.profile,
            UserProfile::Student {
                student_number: "2024002".into(),
                class_name: Some("CS-2".into()),
                major: None,
            }
        );
    }

    #[test]
    fn corrupt_rows_surface_as_database_errors() {
        assert!(matches!(
            user_from_model(row("STUDENT", None)),
            Err(DomainError::Database { .. })
        ));
        assert!(matches!(
            user_from_model(row("JANITOR", None)),
            Err(DomainError::Database { .. })
        ));
    }
}
