#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use dormitory::contract::model::{NewRoom, NewUser, Room, RoomType, User, UserProfile};
use dormitory::infra::password::Argon2PasswordHasher;
use dormitory::{ConcreteAppServices, Dormitory, DormitoryConfig};

/// One connection, so every query sees the same in-memory database.
pub async fn connect() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opts).await.expect("in-memory sqlite")
}

fn wire(db: DatabaseConnection) -> Dormitory {
    let hasher = Argon2PasswordHasher::with_cost(256, 1).expect("argon2 params");
    Dormitory::new(db, DormitoryConfig::default(), Arc::new(hasher))
}

pub async fn setup() -> Dormitory {
    let db = connect().await;
    dormitory::migrate(&db).await.expect("migrations");
    wire(db)
}

/// A real pool, so transactions run on separate connections.
pub async fn setup_pooled(url: &str, max_connections: u32) -> Dormitory {
    let mut opts = ConnectOptions::new(url.to_owned());
    opts.max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await.expect("pooled connection");
    dormitory::migrate(&db).await.expect("migrations");
    wire(db)
}

pub fn days_ago(n: u64) -> NaiveDate {
    let today = Utc::now().date_naive();
    today.checked_sub_days(Days::new(n)).unwrap()
}

pub async fn student(svc: &ConcreteAppServices, username: &str, number: &str) -> User {
    svc.users
        .create_user(NewUser {
            username: username.into(),
            password: "student123".into(),
            real_name: format!("Student {username}"),
            email: Some(format!("{username}@student.com")),
            phone: None,
            profile: UserProfile::Student {
                student_number: number.into(),
                class_name: Some("CS-1".into()),
                major: Some("Computer Science".into()),
            },
        })
        .await
        .expect("create student")
}

pub async fn admin(svc: &ConcreteAppServices, username: &str) -> User {
    svc.users
        .create_user(NewUser {
            username: username.into(),
            password: "admin123".into(),
            real_name: "Administrator".into(),
            email: None,
            phone: None,
            profile: UserProfile::Admin {
                department: Some("Logistics".into()),
                position: None,
            },
        })
        .await
        .expect("create admin")
}

pub async fn room(svc: &ConcreteAppServices, building: &str, number: &str, capacity: u32) -> Room {
    svc.rooms
        .create_room(NewRoom {
            building_name: building.into(),
            room_number: number.into(),
            capacity,
            room_type: RoomType::Mixed,
            status: None,
            monthly_rent: Some(500.0),
            description: None,
        })
        .await
        .expect("create room")
}
