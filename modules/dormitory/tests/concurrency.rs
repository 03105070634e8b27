//! Occupancy under parallel requests on a multi-connection pool.

mod common;

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use dormitory::contract::model::{NewAssignment, RoomStatus};
use dormitory::domain::error::DomainError;
use dormitory::{ConcreteAppServices, Dormitory};

use common::{room, student};

const STUDENTS: usize = 8;
const CAPACITY: u32 = 2;

fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

async fn file_sqlite(dir: &TempDir) -> Dormitory {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("dorm.db").display());
    common::setup_pooled(&url, 8).await
}

/// `STUDENTS` parallel assigns into one `CAPACITY`-bed room: exactly
/// `CAPACITY` win, the rest are refused as full, never a 500.
async fn parallel_assigns_respect_capacity(svc: Arc<ConcreteAppServices>, round: usize) {
    let run = tag();
    let r = room(&svc, &format!("P{run}"), "101", CAPACITY).await;
    let mut students = Vec::new();
    for i in 0..STUDENTS {
        students.push(student(&svc, &format!("s{run}{i}"), &format!("{run}{i}")).await);
    }

    let mut tasks = Vec::new();
    for s in &students {
        let svc = Arc::clone(&svc);
        let new = NewAssignment {
            student_id: s.id,
            room_id: r.id,
            check_in_date: Utc::now().date_naive(),
            monthly_fee: None,
        };
        tasks.push(tokio::spawn(async move { svc.assignments.assign(new).await }));
    }

    let mut placed = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => placed += 1,
            Err(DomainError::Rejected { message }) => {
                assert!(message.contains("full") || message.contains("not available"), "{message}")
            }
            Err(other) => panic!("round {round}: unexpected error {other:?}"),
        }
    }

    let active = svc.assignments.active_for_room(r.id).await.unwrap();
    let after = svc.rooms.get_room(r.id).await.unwrap();
    assert_eq!(placed, CAPACITY as usize, "round {round}");
    assert_eq!(active.len(), CAPACITY as usize, "round {round}");
    assert_eq!(after.occupancy, CAPACITY, "round {round}");
    assert_eq!(after.status, RoomStatus::Full, "round {round}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_assigns_never_overfill_a_room() {
    let dir = TempDir::new().unwrap();
    let module = file_sqlite(&dir).await;
    for round in 0..5 {
        parallel_assigns_respect_capacity(module.services(), round).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_check_outs_release_one_bed() {
    let dir = TempDir::new().unwrap();
    let module = file_sqlite(&dir).await;
    let svc = module.services();

    let r = room(&svc, "Q", "201", 2).await;
    let a = student(&svc, "alice", "2024101").await;
    let b = student(&svc, "bob", "2024102").await;
    for s in [&a, &b] {
        svc.assignments
            .assign(NewAssignment {
                student_id: s.id,
                room_id: r.id,
                check_in_date: Utc::now().date_naive(),
                monthly_fee: None,
            })
            .await
            .unwrap();
    }

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let svc = Arc::clone(&svc);
        let student_id = a.id;
        tasks.push(tokio::spawn(async move {
            svc.assignments
                .check_out(student_id, Utc::now().date_naive())
                .await
        }));
    }
    let mut done = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => done += 1,
            Err(DomainError::NotFound { .. }) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    let after = svc.rooms.get_room(r.id).await.unwrap();
    assert_eq!(done, 1);
    assert_eq!(after.occupancy, 1);
    assert_eq!(after.status, RoomStatus::Available);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn capacity_cut_and_assign_race_keeps_invariant() {
    let dir = TempDir::new().unwrap();
    let module = file_sqlite(&dir).await;
    let svc = module.services();

    let r = room(&svc, "R", "301", 3).await;
    let a = student(&svc, "carol", "2024201").await;
    let b = student(&svc, "dave", "2024202").await;
    svc.assignments
        .assign(NewAssignment {
            student_id: a.id,
            room_id: r.id,
            check_in_date: Utc::now().date_naive(),
            monthly_fee: None,
        })
        .await
        .unwrap();

    let assign = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move {
            svc.assignments
                .assign(NewAssignment {
                    student_id: b.id,
                    room_id: r.id,
                    check_in_date: Utc::now().date_naive(),
                    monthly_fee: None,
                })
                .await
        })
    };
    let shrink = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move {
            svc.rooms
                .update_room(
                    r.id,
                    dormitory::contract::model::RoomPatch {
                        capacity: Some(1),
                        ..Default::default()
                    },
                )
                .await
        })
    };
    let assigned = assign.await.unwrap();
    let shrunk = shrink.await.unwrap();

    // Whichever ran second saw the first one's result.
    assert!(assigned.is_ok() != shrunk.is_ok(), "{assigned:?} / {shrunk:?}");
    let after = svc.rooms.get_room(r.id).await.unwrap();
    let active = svc.assignments.active_for_room(r.id).await.unwrap();
    assert!(after.occupancy <= after.capacity);
    assert_eq!(after.occupancy as usize, active.len());
}

/// Same scenario against Postgres, where row locks do the serializing.
#[cfg(feature = "integration")]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_assigns_never_overfill_a_room_on_postgres() {
    let url = std::env::var("DORMITORY_TEST_PG_URL")
        .expect("DORMITORY_TEST_PG_URL must point at a scratch database");
    let module = common::setup_pooled(&url, 16).await;
    for round in 0..20 {
        parallel_assigns_respect_capacity(module.services(), round).await;
    }
}
