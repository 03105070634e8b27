use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

// Pure models for inter-module communication (no serde/utoipa).

/// Returned when a stored or submitted enum label is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} value '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of upper-case labels shared by storage and transport.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Account role, derived from the user's profile variant.
    Role, "role" {
        Admin => "ADMIN",
        Student => "STUDENT",
    }
);

labelled_enum!(
    RoomType, "room type" {
        Male => "MALE",
        Female => "FEMALE",
        Mixed => "MIXED",
    }
);

labelled_enum!(
    /// `Full` is derived from occupancy; `Maintenance` and `Closed` are manual overrides.
    RoomStatus, "room status" {
        Available => "AVAILABLE",
        Full => "FULL",
        Maintenance => "MAINTENANCE",
        Closed => "CLOSED",
    }
);

labelled_enum!(
    AssignmentStatus, "assignment status" {
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
);

labelled_enum!(
    RepairType, "repair type" {
        Plumbing => "PLUMBING",
        Electrical => "ELECTRICAL",
        Furniture => "FURNITURE",
        Appliance => "APPLIANCE",
        Other => "OTHER",
    }
);

labelled_enum!(
    RepairStatus, "repair status" {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
);

labelled_enum!(
    RepairPriority, "repair priority" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
);

impl Default for RepairPriority {
    fn default() -> Self {
        Self::Medium
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Role-specific attributes. A student never carries a department and an
/// admin never carries a student number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserProfile {
    Student {
        student_number: String,
        class_name: Option<String>,
        major: Option<String>,
    },
    Admin {
        department: Option<String>,
        position: Option<String>,
    },
}

impl UserProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Admin { .. } => Role::Admin,
        }
    }

    pub fn student_number(&self) -> Option<&str> {
        match self {
            Self::Student { student_number, .. } => Some(student_number),
            Self::Admin { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub real_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn is_student(&self) -> bool {
        self.role() == Role::Student
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

/// Data for creating a new user. The password is plain text here and is
/// hashed by the service before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub real_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile: UserProfile,
}

/// Partial update. Student fields apply only to students, admin fields only
/// to admins; mismatched fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
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

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub class_name: Option<String>,
    pub major: Option<String>,
    /// Substring of username, real name, email or student number.
    pub keyword: Option<String>,
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub building_name: String,
    pub room_number: String,
    pub capacity: u32,
    pub occupancy: u32,
    pub room_type: RoomType,
    pub status: RoomStatus,
    pub monthly_rent: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub building_name: String,
    pub room_number: String,
    pub capacity: u32,
    pub room_type: RoomType,
    /// Only `Available`, `Maintenance` or `Closed`; defaults to `Available`.
    pub status: Option<RoomStatus>,
    pub monthly_rent: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomPatch {
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub capacity: Option<u32>,
    pub room_type: Option<RoomType>,
    pub status: Option<RoomStatus>,
    pub monthly_rent: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomFilter {
    pub building_name: Option<String>,
    pub room_type: Option<RoomType>,
    pub status: Option<RoomStatus>,
    pub available_only: bool,
    pub full_only: bool,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
    pub keyword: Option<String>,
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// Time-bounded link between a student and a room. Dates are UTC calendar dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
    pub monthly_fee: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }

    /// Whole days between check-in and check-out, or `today` while still open.
    pub fn days_stayed(&self, today: NaiveDate) -> i64 {
        let end = self.check_out_date.unwrap_or(today);
        (end - self.check_in_date).num_days().max(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    /// Defaults to the room's monthly rent.
    pub monthly_fee: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentFilter {
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<AssignmentStatus>,
    pub check_in_from: Option<NaiveDate>,
    pub check_in_to: Option<NaiveDate>,
    pub check_out_from: Option<NaiveDate>,
    pub check_out_to: Option<NaiveDate>,
    /// Active assignments checked in at least this many days ago.
    pub long_term_days: Option<u32>,
}

// ---------------------------------------------------------------------------
// Repair tickets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RepairTicket {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub description: String,
    pub repair_type: RepairType,
    pub status: RepairStatus,
    pub priority: RepairPriority,
    pub assigned_admin_id: Option<Uuid>,
    pub admin_notes: Option<String>,
    pub repair_cost: Option<f64>,
    pub requested_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepairTicket {
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub description: String,
    pub repair_type: RepairType,
    pub priority: RepairPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepairTicketPatch {
    pub description: Option<String>,
    pub repair_type: Option<RepairType>,
    pub priority: Option<RepairPriority>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepairFilter {
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<RepairStatus>,
    pub repair_type: Option<RepairType>,
    pub priority: Option<RepairPriority>,
    /// Inclusive bounds on `requested_at`.
    pub requested_from: Option<DateTime<Utc>>,
    pub requested_to: Option<DateTime<Utc>>,
    /// Substring of description or admin notes.
    pub keyword: Option<String>,
}
