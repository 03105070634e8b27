use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    Assignment, AssignmentFilter, NewRepairTicket, NewRoom, NewUser, RepairFilter,
    RepairTicket, RepairTicketPatch, Role, Room, RoomFilter, RoomPatch, User, UserFilter,
    UserPatch, UserProfile,
};
use crate::domain::error::DomainError;

/// Parse an upper-case enum label from a request field.
fn parse<T>(field: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| DomainError::validation(field, e.to_string()))
}

fn parse_opt<T>(field: &str, raw: Option<&str>) -> Result<Option<T>, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|r| parse(field, r)).transpose()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// REST DTO for user representation. Role-specific fields are null for the
/// other role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub real_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `ADMIN` or `STUDENT`
    pub role: String,
    pub student_number: Option<String>,
    pub class_name: Option<String>,
    pub major: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub username: String,
    pub password: String,
    pub real_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `ADMIN` or `STUDENT`
    pub role: String,
    pub student_number: Option<String>,
    pub class_name: Option<String>,
    pub major: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
}

/// REST DTO for updating a user (partial). An empty string clears an optional field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserReq {
    pub username: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub student_number: Option<String>,
    pub class_name: Option<String>,
    pub major: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePasswordReq {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub class_name: Option<String>,
    pub major: Option<String>,
    pub keyword: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        let role = user.role().as_str().to_string();
        let (student_number, class_name, major, department, position) = match user.profile {
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
        Self {
            id: user.id,
            username: user.username,
            real_name: user.real_name,
            email: user.email,
            phone: user.phone,
            role,
            student_number,
            class_name,
            major,
            department,
            position,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl TryFrom<CreateUserReq> for NewUser {
    type Error = DomainError;

    fn try_from(req: CreateUserReq) -> Result<Self, Self::Error> {
        let profile = match parse::<Role>("role", &req.role)? {
            Role::Student => UserProfile::Student {
                student_number: req.student_number.ok_or_else(|| {
                    DomainError::validation("student_number", "required for students")
                })?,
                class_name: req.class_name,
                major: req.major,
            },
            Role::Admin => UserProfile::Admin {
                department: req.department,
                position: req.position,
            },
        };
        Ok(Self {
            username: req.username,
            password: req.password,
            real_name: req.real_name,
            email: req.email,
            phone: req.phone,
            profile,
        })
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            username: req.username,
            real_name: req.real_name,
            email: req.email,
            phone: req.phone,
            student_number: req.student_number,
            class_name: req.class_name,
            major: req.major,
            department: req.department,
            position: req.position,
        }
    }
}

impl TryFrom<ListUsersQuery> for UserFilter {
    type Error = DomainError;

    fn try_from(q: ListUsersQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            role: parse_opt("role", q.role.as_deref())?,
            class_name: q.class_name,
            major: q.major,
            keyword: q.keyword,
        })
    }
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomDto {
    pub id: Uuid,
    pub building_name: String,
    pub room_number: String,
    pub capacity: u32,
    pub occupancy: u32,
    pub free_beds: u32,
    /// `MALE`, `FEMALE` or `MIXED`
    pub room_type: String,
    /// `AVAILABLE`, `FULL`, `MAINTENANCE` or `CLOSED`
    pub status: String,
    pub monthly_rent: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomReq {
    pub building_name: String,
    pub room_number: String,
    pub capacity: u32,
    pub room_type: String,
    /// Defaults to `AVAILABLE`; `FULL` is rejected.
    pub status: Option<String>,
    pub monthly_rent: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateRoomReq {
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub capacity: Option<u32>,
    pub room_type: Option<String>,
    pub status: Option<String>,
    pub monthly_rent: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomListDto {
    pub rooms: Vec<RoomDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRoomsQuery {
    pub building_name: Option<String>,
    pub room_type: Option<String>,
    pub status: Option<String>,
    pub available_only: Option<bool>,
    pub full_only: Option<bool>,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
    pub keyword: Option<String>,
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            free_beds: room.free_beds(),
            id: room.id,
            building_name: room.building_name,
            room_number: room.room_number,
            capacity: room.capacity,
            occupancy: room.occupancy,
            room_type: room.room_type.as_str().to_string(),
            status: room.status.as_str().to_string(),
            monthly_rent: room.monthly_rent,
            description: room.description,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

impl TryFrom<CreateRoomReq> for NewRoom {
    type Error = DomainError;

    fn try_from(req: CreateRoomReq) -> Result<Self, Self::Error> {
        Ok(Self {
            building_name: req.building_name,
            room_number: req.room_number,
            capacity: req.capacity,
            room_type: parse("room_type", &req.room_type)?,
            status: parse_opt("status", req.status.as_deref())?,
            monthly_rent: req.monthly_rent,
            description: req.description,
        })
    }
}

impl TryFrom<UpdateRoomReq> for RoomPatch {
    type Error = DomainError;

    fn try_from(req: UpdateRoomReq) -> Result<Self, Self::Error> {
        Ok(Self {
            building_name: req.building_name,
            room_number: req.room_number,
            capacity: req.capacity,
            room_type: parse_opt("room_type", req.room_type.as_deref())?,
            status: parse_opt("status", req.status.as_deref())?,
            monthly_rent: req.monthly_rent,
            description: req.description,
        })
    }
}

impl TryFrom<ListRoomsQuery> for RoomFilter {
    type Error = DomainError;

    fn try_from(q: ListRoomsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            building_name: q.building_name,
            room_type: parse_opt("room_type", q.room_type.as_deref())?,
            status: parse_opt("status", q.status.as_deref())?,
            available_only: q.available_only.unwrap_or(false),
            full_only: q.full_only.unwrap_or(false),
            min_capacity: q.min_capacity,
            max_capacity: q.max_capacity,
            min_rent: q.min_rent,
            max_rent: q.max_rent,
            keyword: q.keyword,
        })
    }
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDto {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: Option<NaiveDate>,
    /// `ACTIVE`, `COMPLETED` or `CANCELLED`
    pub status: String,
    pub monthly_fee: Option<f64>,
    pub notes: Option<String>,
    /// Whole days from check-in to check-out, or to today (UTC) while active.
    pub days_stayed: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssignmentDto {
    pub fn from_model(a: Assignment, today: NaiveDate) -> Self {
        Self {
            days_stayed: a.days_stayed(today),
            id: a.id,
            student_id: a.student_id,
            room_id: a.room_id,
            check_in_date: a.check_in_date,
            check_out_date: a.check_out_date,
            status: a.status.as_str().to_string(),
            monthly_fee: a.monthly_fee,
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignReq {
    pub student_id: Uuid,
    pub room_id: Uuid,
    /// Defaults to today (UTC).
    pub check_in_date: Option<NaiveDate>,
    /// Defaults to the room's monthly rent.
    pub monthly_fee: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckOutReq {
    /// Defaults to today (UTC).
    pub check_out_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CancelReq {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentListDto {
    pub assignments: Vec<AssignmentDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAssignmentsQuery {
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<String>,
    pub check_in_from: Option<NaiveDate>,
    pub check_in_to: Option<NaiveDate>,
    pub check_out_from: Option<NaiveDate>,
    pub check_out_to: Option<NaiveDate>,
    /// Only ACTIVE assignments checked in at least this many days ago.
    pub long_term_days: Option<u32>,
}

impl TryFrom<ListAssignmentsQuery> for AssignmentFilter {
    type Error = DomainError;

    fn try_from(q: ListAssignmentsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: q.student_id,
            room_id: q.room_id,
            status: parse_opt("status", q.status.as_deref())?,
            check_in_from: q.check_in_from,
            check_in_to: q.check_in_to,
            check_out_from: q.check_out_from,
            check_out_to: q.check_out_to,
            long_term_days: q.long_term_days,
        })
    }
}

// ---------------------------------------------------------------------------
// Repair tickets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepairTicketDto {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub description: String,
    pub repair_type: String,
    pub status: String,
    pub priority: String,
    pub assigned_admin_id: Option<Uuid>,
    pub admin_notes: Option<String>,
    pub repair_cost: Option<f64>,
    pub requested_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRepairReq {
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub description: String,
    /// `PLUMBING`, `ELECTRICAL`, `FURNITURE`, `APPLIANCE` or `OTHER`
    pub repair_type: String,
    /// Defaults to `MEDIUM`.
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateRepairReq {
    pub description: Option<String>,
    pub repair_type: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignRepairReq {
    pub admin_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CompleteRepairReq {
    pub notes: Option<String>,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepairListDto {
    pub tickets: Vec<RepairTicketDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRepairsQuery {
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<String>,
    pub repair_type: Option<String>,
    pub priority: Option<String>,
    /// RFC 3339 timestamps, both inclusive.
    pub requested_from: Option<DateTime<Utc>>,
    pub requested_to: Option<DateTime<Utc>>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverdueQuery {
    /// Minimum age in days; defaults to 7.
    pub days: Option<u32>,
}

impl From<RepairTicket> for RepairTicketDto {
    fn from(t: RepairTicket) -> Self {
        Self {
            id: t.id,
            student_id: t.student_id,
            room_id: t.room_id,
            description: t.description,
            repair_type: t.repair_type.as_str().to_string(),
            status: t.status.as_str().to_string(),
            priority: t.priority.as_str().to_string(),
            assigned_admin_id: t.assigned_admin_id,
            admin_notes: t.admin_notes,
            repair_cost: t.repair_cost,
            requested_at: t.requested_at,
            assigned_at: t.assigned_at,
            completed_at: t.completed_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<Vec<RepairTicket>> for RepairListDto {
    fn from(tickets: Vec<RepairTicket>) -> Self {
        let tickets: Vec<RepairTicketDto> = tickets.into_iter().map(Into::into).collect();
        Self {
            total: tickets.len(),
            tickets,
        }
    }
}

impl TryFrom<CreateRepairReq> for NewRepairTicket {
    type Error = DomainError;

    fn try_from(req: CreateRepairReq) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: req.student_id,
            room_id: req.room_id,
            description: req.description,
            repair_type: parse("repair_type", &req.repair_type)?,
            priority: parse_opt("priority", req.priority.as_deref())?.unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateRepairReq> for RepairTicketPatch {
    type Error = DomainError;

    fn try_from(req: UpdateRepairReq) -> Result<Self, Self::Error> {
        Ok(Self {
            description: req.description,
            repair_type: parse_opt("repair_type", req.repair_type.as_deref())?,
            priority: parse_opt("priority", req.priority.as_deref())?,
        })
    }
}

impl TryFrom<ListRepairsQuery> for RepairFilter {
    type Error = DomainError;

    fn try_from(q: ListRepairsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: q.student_id,
            room_id: q.room_id,
            status: parse_opt("status", q.status.as_deref())?,
            repair_type: parse_opt("repair_type", q.repair_type.as_deref())?,
            priority: parse_opt("priority", q.priority.as_deref())?,
            requested_from: q.requested_from,
            requested_to: q.requested_to,
            keyword: q.keyword,
        })
    }
}
