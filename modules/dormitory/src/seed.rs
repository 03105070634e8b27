use chrono::{Days, Utc};
use tracing::info;

use crate::contract::model::{NewAssignment, NewRoom, NewUser, RoomType, UserProfile};
use crate::domain::error::DomainError;
use crate::module::ConcreteAppServices;

struct DemoStudent {
    username: &'static str,
    real_name: &'static str,
    email: &'static str,
    phone: &'static str,
    student_number: &'static str,
    class_name: &'static str,
    major: &'static str,
}

const STUDENTS: [DemoStudent; 4] = [
    DemoStudent {
        username: "student",
        real_name: "Zhang San",
        email: "zhangsan@student.com",
        phone: "13800138001",
        student_number: "2024001",
        class_name: "Computer Science 1",
        major: "Computer Science",
    },
    DemoStudent {
        username: "student2",
        real_name: "Li Si",
        email: "lisi@student.com",
        phone: "13800138002",
        student_number: "2024002",
        class_name: "Software Engineering 1",
        major: "Software Engineering",
    },
    DemoStudent {
        username: "student3",
        real_name: "Wang Wu",
        email: "wangwu@student.com",
        phone: "13800138003",
        student_number: "2024003",
        class_name: "Network Engineering 1",
        major: "Network Engineering",
    },
    DemoStudent {
        username: "student4",
        real_name: "Zhao Liu",
        email: "zhaoliu@student.com",
        phone: "13800138004",
        student_number: "2024004",
        class_name: "Computer Science 1",
        major: "Computer Science",
    },
];

const FOUR_BED: &str = "Four beds, air conditioning, water heater, private bathroom";
const TWO_BED: &str = "Two beds, air conditioning, water heater, private bathroom, balcony";

// (building, room, capacity, type, rent, description)
const ROOMS: [(&str, &str, u32, RoomType, f64, &str); 6] = [
    ("A", "101", 4, RoomType::Male, 500.0, FOUR_BED),
    ("A", "102", 4, RoomType::Male, 500.0, FOUR_BED),
    ("A", "103", 4, RoomType::Male, 500.0, FOUR_BED),
    ("B", "201", 4, RoomType::Female, 500.0, FOUR_BED),
    ("B", "202", 4, RoomType::Female, 500.0, FOUR_BED),
    ("C", "301", 2, RoomType::Male, 800.0, TWO_BED),
];

// (student index, room index, days ago)
const PLACEMENTS: [(usize, usize, u64); 4] = [(0, 0, 30), (1, 0, 25), (2, 1, 20), (3, 5, 15)];

/// Populate an empty database through the services. Returns `false` if any
/// user already exists.
pub(crate) async fn seed_demo_data(svc: &ConcreteAppServices) -> Result<bool, DomainError> {
    if svc.users.count_users().await? > 0 {
        info!("Users present, skipping demo data");
        return Ok(false);
    }
    info!("Seeding demo data");

    svc.users
        .create_user(NewUser {
            username: "admin".into(),
            password: "admin123".into(),
            real_name: "System Administrator".into(),
            email: Some("admin@dormitory.com".into()),
            phone: Some("13800138000".into()),
            profile: UserProfile::Admin {
                department: Some("Logistics Office".into()),
                position: Some("System Administrator".into()),
            },
        })
        .await?;

    let mut students = Vec::with_capacity(STUDENTS.len());
    for s in &STUDENTS {
        let user = svc
            .users
            .create_user(NewUser {
                username: s.username.into(),
                password: "student123".into(),
                real_name: s.real_name.into(),
                email: Some(s.email.into()),
                phone: Some(s.phone.into()),
                profile: UserProfile::Student {
                    student_number: s.student_number.into(),
                    class_name: Some(s.class_name.into()),
                    major: Some(s.major.into()),
                },
            })
            .await?;
        students.push(user.id);
    }

    let mut rooms = Vec::with_capacity(ROOMS.len());
    for (building, number, capacity, room_type, rent, description) in ROOMS {
        let room = svc
            .rooms
            .create_room(NewRoom {
                building_name: building.into(),
                room_number: number.into(),
                capacity,
                room_type,
                status: None,
                monthly_rent: Some(rent),
                description: Some(description.into()),
            })
            .await?;
        rooms.push(room.id);
    }

    let today = Utc::now().date_naive();
    for (student, room, days_ago) in PLACEMENTS {
        let check_in_date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
        svc.assignments
            .assign(NewAssignment {
                student_id: students[student],
                room_id: rooms[room],
                check_in_date,
                monthly_fee: None,
            })
            .await?;
    }

    info!(
        users = STUDENTS.len() + 1,
        rooms = ROOMS.len(),
        "Demo data ready; log in as admin/admin123 or student/student123"
    );
    Ok(true)
}
