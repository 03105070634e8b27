mod common;

use std::time::Duration;

use chrono::Utc;
use dormitory::contract::model::{
    AssignmentFilter, AssignmentStatus, NewAssignment, NewRepairTicket, RepairFilter,
    RepairPriority, RepairStatus, RepairType, Role, RoomFilter, RoomPatch, RoomStatus, UserFilter,
    UserPatch, UserProfile,
};
use dormitory::domain::error::DomainError;

use common::{admin, days_ago, room, setup, student};

fn placement(student_id: uuid::Uuid, room_id: uuid::Uuid) -> NewAssignment {
    NewAssignment {
        student_id,
        room_id,
        check_in_date: Utc::now().date_naive(),
        monthly_fee: None,
    }
}

#[tokio::test]
async fn room_fills_and_frees_with_assignments() {
    let module = setup().await;
    let svc = module.services();

    let a = student(&svc, "alice", "2024001").await;
    let b = student(&svc, "bob", "2024002").await;
    let c = student(&svc, "carol", "2024003").await;
    let r = room(&svc, "A", "101", 2).await;

    svc.assignments.assign(placement(a.id, r.id)).await.unwrap();
    let second = svc.assignments.assign(placement(b.id, r.id)).await.unwrap();
    assert_eq!(second.monthly_fee, Some(500.0), "fee defaults to the room rent");

    let full = svc.rooms.get_room(r.id).await.unwrap();
    assert_eq!(full.occupancy, 2);
    assert_eq!(full.status, RoomStatus::Full);

    let err = svc.assignments.assign(placement(c.id, r.id)).await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }), "got {err:?}");

    let done = svc.assignments.check_out(a.id, Utc::now().date_naive()).await.unwrap();
    assert_eq!(done.status, AssignmentStatus::Completed);
    assert!(done.check_out_date.is_some());

    let freed = svc.rooms.get_room(r.id).await.unwrap();
    assert_eq!(freed.occupancy, 1);
    assert_eq!(freed.status, RoomStatus::Available);

    svc.assignments.assign(placement(c.id, r.id)).await.unwrap();
    assert_eq!(svc.assignments.active_for_room(r.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn student_holds_at_most_one_active_assignment() {
    let module = setup().await;
    let svc = module.services();

    let s = student(&svc, "dave", "2024010").await;
    let r1 = room(&svc, "A", "101", 4).await;
    let r2 = room(&svc, "A", "102", 4).await;

    svc.assignments.assign(placement(s.id, r1.id)).await.unwrap();
    let err = svc.assignments.assign(placement(s.id, r2.id)).await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));

    let untouched = svc.rooms.get_room(r2.id).await.unwrap();
    assert_eq!(untouched.occupancy, 0, "failed assign must not leak occupancy");
}

#[tokio::test]
async fn assign_rejects_admins_and_closed_rooms() {
    let module = setup().await;
    let svc = module.services();

    let boss = admin(&svc, "boss").await;
    let s = student(&svc, "erin", "2024011").await;
    let r = room(&svc, "B", "201", 2).await;

    let err = svc.assignments.assign(placement(boss.id, r.id)).await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));

    svc.rooms
        .update_room(
            r.id,
            RoomPatch {
                status: Some(RoomStatus::Maintenance),
                ..RoomPatch::default()
            },
        )
        .await
        .unwrap();
    let err = svc.assignments.assign(placement(s.id, r.id)).await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));

    let err = svc
        .assignments
        .assign(placement(s.id, uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Room", .. }));
}

#[tokio::test]
async fn check_out_without_active_assignment_is_not_found() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "frank", "2024012").await;

    let err = svc
        .assignments
        .check_out(s.id, Utc::now().date_naive())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Assignment", .. }));
}

#[tokio::test]
async fn cancel_releases_the_bed_and_keeps_the_reason() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "gina", "2024013").await;
    let r = room(&svc, "C", "301", 1).await;

    let a = svc.assignments.assign(placement(s.id, r.id)).await.unwrap();
    let cancelled = svc.assignments.cancel(a.id, "  moved abroad ").await.unwrap();
    assert_eq!(cancelled.status, AssignmentStatus::Cancelled);
    assert_eq!(cancelled.notes.as_deref(), Some("moved abroad"));
    assert_eq!(cancelled.check_out_date, None);

    let r = svc.rooms.get_room(r.id).await.unwrap();
    assert_eq!((r.occupancy, r.status), (0, RoomStatus::Available));

    let err = svc.assignments.cancel(a.id, "again").await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidState { .. }));
}

#[tokio::test]
async fn assignment_filters() {
    let module = setup().await;
    let svc = module.services();
    let old = student(&svc, "hank", "2024014").await;
    let new = student(&svc, "iris", "2024015").await;
    let r = room(&svc, "A", "101", 4).await;

    svc.assignments
        .assign(NewAssignment {
            check_in_date: days_ago(200),
            ..placement(old.id, r.id)
        })
        .await
        .unwrap();
    svc.assignments
        .assign(NewAssignment {
            monthly_fee: Some(420.0),
            ..placement(new.id, r.id)
        })
        .await
        .unwrap();

    let long_term = svc
        .assignments
        .list_assignments(AssignmentFilter {
            long_term_days: Some(180),
            ..AssignmentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(long_term.len(), 1);
    assert_eq!(long_term[0].student_id, old.id);
    assert!(long_term[0].days_stayed(Utc::now().date_naive()) >= 200);

    let by_student = svc
        .assignments
        .list_assignments(AssignmentFilter {
            student_id: Some(new.id),
            ..AssignmentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_student.len(), 1);
    assert_eq!(by_student[0].monthly_fee, Some(420.0));
}

#[tokio::test]
async fn duplicate_keys_are_reported() {
    let module = setup().await;
    let svc = module.services();
    student(&svc, "jack", "2024016").await;

    let mut dup = dormitory::contract::model::NewUser {
        username: "jack".into(),
        password: "secret1".into(),
        real_name: "Jack Again".into(),
        email: None,
        phone: None,
        profile: UserProfile::Student {
            student_number: "2024999".into(),
            class_name: None,
            major: None,
        },
    };
    let err = svc.users.create_user(dup.clone()).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { field: "username", .. }));

    dup.username = "jack2".into();
    dup.email = Some("JACK@student.com".into());
    let err = svc.users.create_user(dup.clone()).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { field: "email", .. }));

    dup.email = None;
    dup.profile = UserProfile::Student {
        student_number: "2024016".into(),
        class_name: None,
        major: None,
    };
    let err = svc.users.create_user(dup).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { field: "student_number", .. }));

    room(&svc, "A", "101", 4).await;
    let err = svc
        .rooms
        .create_room(dormitory::contract::model::NewRoom {
            building_name: "A".into(),
            room_number: "101".into(),
            capacity: 2,
            room_type: dormitory::contract::model::RoomType::Male,
            status: None,
            monthly_rent: None,
            description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { entity: "Room", .. }));
}

#[tokio::test]
async fn user_update_applies_only_matching_profile_fields() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "kate", "2024017").await;

    let updated = svc
        .users
        .update_user(
            s.id,
            UserPatch {
                real_name: Some("Kate K.".into()),
                major: Some(String::new()),
                department: Some("ignored".into()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.real_name, "Kate K.");
    assert_eq!(
        updated.profile,
        UserProfile::Student {
            student_number: "2024017".into(),
            class_name: Some("CS-1".into()),
            major: None,
        }
    );

    let students = svc
        .users
        .list_users(UserFilter {
            role: Some(Role::Student),
            keyword: Some("2024017".into()),
            ..UserFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(students.len(), 1);
}

#[tokio::test]
async fn passwords_change_and_authenticate() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "liam", "2024018").await;

    assert_eq!(svc.users.authenticate("liam", "student123").await.unwrap().id, s.id);
    let unknown = svc.users.authenticate("nobody", "student123").await.unwrap_err();
    let wrong = svc.users.authenticate("liam", "nope").await.unwrap_err();
    assert_eq!(unknown, wrong, "failures must not reveal which part was wrong");

    let err = svc.users.change_password(s.id, "bad", "newpass1").await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));
    let err = svc.users.change_password(s.id, "student123", "123").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    svc.users.change_password(s.id, "student123", "newpass1").await.unwrap();
    assert!(svc.users.authenticate("liam", "student123").await.is_err());
    assert!(svc.users.authenticate("liam", "newpass1").await.is_ok());
}

#[tokio::test]
async fn students_without_room() {
    let module = setup().await;
    let svc = module.services();
    let housed = student(&svc, "mia", "2024019").await;
    let homeless = student(&svc, "noah", "2024020").await;
    admin(&svc, "boss").await;
    let r = room(&svc, "A", "101", 4).await;
    svc.assignments.assign(placement(housed.id, r.id)).await.unwrap();

    let waiting = svc.users.list_students_without_room().await.unwrap();
    let ids: Vec<_> = waiting.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![homeless.id]);
}

#[tokio::test]
async fn delete_guards() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "olga", "2024021").await;
    let idle = student(&svc, "pete", "2024022").await;
    let r = room(&svc, "A", "101", 2).await;
    let empty = room(&svc, "A", "102", 2).await;

    svc.assignments.assign(placement(s.id, r.id)).await.unwrap();

    assert!(matches!(
        svc.users.delete_user(s.id).await.unwrap_err(),
        DomainError::Rejected { .. }
    ));
    assert!(matches!(
        svc.rooms.delete_room(r.id).await.unwrap_err(),
        DomainError::Rejected { .. }
    ));

    svc.assignments.check_out(s.id, Utc::now().date_naive()).await.unwrap();
    // History still references both.
    assert!(svc.users.delete_user(s.id).await.is_err());
    assert!(svc.rooms.delete_room(r.id).await.is_err());

    svc.users.delete_user(idle.id).await.unwrap();
    svc.rooms.delete_room(empty.id).await.unwrap();
    assert!(matches!(
        svc.users.get_user(idle.id).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn room_updates_respect_occupancy() {
    let module = setup().await;
    let svc = module.services();
    let a = student(&svc, "quinn", "2024023").await;
    let b = student(&svc, "rosa", "2024024").await;
    let r = room(&svc, "A", "101", 3).await;
    room(&svc, "A", "102", 3).await;

    svc.assignments.assign(placement(a.id, r.id)).await.unwrap();
    svc.assignments.assign(placement(b.id, r.id)).await.unwrap();

    let shrink = |capacity| RoomPatch {
        capacity: Some(capacity),
        ..RoomPatch::default()
    };
    assert!(matches!(
        svc.rooms.update_room(r.id, shrink(1)).await.unwrap_err(),
        DomainError::Rejected { .. }
    ));

    let updated = svc.rooms.update_room(r.id, shrink(2)).await.unwrap();
    assert_eq!(updated.status, RoomStatus::Full);

    let err = svc
        .rooms
        .update_room(
            r.id,
            RoomPatch {
                room_number: Some("102".into()),
                ..RoomPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { .. }));

    let full = svc
        .rooms
        .list_rooms(RoomFilter {
            full_only: true,
            ..RoomFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(full.len(), 1);
    let available = svc.rooms.available_rooms().await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].room_number, "102");
}

#[tokio::test]
async fn repair_lifecycle() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "sam", "2024025").await;
    let boss = admin(&svc, "boss").await;
    let r = room(&svc, "A", "101", 4).await;

    let ticket = svc
        .repairs
        .create_ticket(NewRepairTicket {
            student_id: s.id,
            room_id: r.id,
            description: "Leaking tap".into(),
            repair_type: RepairType::Plumbing,
            priority: RepairPriority::High,
        })
        .await
        .unwrap();
    assert_eq!(ticket.status, RepairStatus::Pending);

    let err = svc.repairs.complete(ticket.id, None, None).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidState { .. }));

    let err = svc.repairs.assign(ticket.id, s.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));

    let started = svc.repairs.assign(ticket.id, boss.id).await.unwrap();
    assert_eq!(started.status, RepairStatus::InProgress);
    assert_eq!(started.assigned_admin_id, Some(boss.id));
    assert!(started.assigned_at.is_some());
    assert_eq!(svc.repairs.in_progress().await.unwrap().len(), 1);

    assert!(matches!(
        svc.repairs.delete_ticket(ticket.id).await.unwrap_err(),
        DomainError::InvalidState { .. }
    ));
    assert!(matches!(
        svc.repairs.complete(ticket.id, None, Some(-1.0)).await.unwrap_err(),
        DomainError::Validation { .. }
    ));

    let done = svc
        .repairs
        .complete(ticket.id, Some("Replaced washer".into()), Some(35.5))
        .await
        .unwrap();
    assert_eq!(done.status, RepairStatus::Completed);
    assert_eq!(done.repair_cost, Some(35.5));
    assert!(done.completed_at.is_some());

    assert!(matches!(
        svc.repairs.cancel(ticket.id, "too late").await.unwrap_err(),
        DomainError::InvalidState { .. }
    ));

    let found = svc
        .repairs
        .list_tickets(RepairFilter {
            keyword: Some("washer".into()),
            ..RepairFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn admins_cannot_file_tickets() {
    let module = setup().await;
    let svc = module.services();
    let boss = admin(&svc, "boss").await;
    let r = room(&svc, "A", "101", 4).await;

    let err = svc
        .repairs
        .create_ticket(NewRepairTicket {
            student_id: boss.id,
            room_id: r.id,
            description: "Broken chair".into(),
            repair_type: RepairType::Furniture,
            priority: RepairPriority::Low,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));
}

#[tokio::test]
async fn pending_queue_orders_by_priority_then_age() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "tina", "2024026").await;
    let r = room(&svc, "A", "101", 4).await;

    let mut ids = Vec::new();
    for (description, priority) in [
        ("t1", RepairPriority::Low),
        ("t2", RepairPriority::Urgent),
        ("t3", RepairPriority::Medium),
        ("t4", RepairPriority::Urgent),
    ] {
        let t = svc
            .repairs
            .create_ticket(NewRepairTicket {
                student_id: s.id,
                room_id: r.id,
                description: description.into(),
                repair_type: RepairType::Other,
                priority,
            })
            .await
            .unwrap();
        ids.push(t.id);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let queue: Vec<_> = svc
        .repairs
        .pending_queue()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.description)
        .collect();
    assert_eq!(queue, ["t2", "t4", "t3", "t1"]);

    let high = svc.repairs.high_priority_pending().await.unwrap();
    assert_eq!(high.len(), 2);

    svc.repairs.cancel(ids[1], "duplicate").await.unwrap();
    assert_eq!(svc.repairs.pending_queue().await.unwrap()[0].description, "t4");
    assert_eq!(svc.repairs.overdue(0).await.unwrap().len(), 3);
    assert!(svc.repairs.overdue(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn seeding_runs_once() {
    let module = setup().await;
    assert!(module.seed().await.unwrap());
    assert!(!module.seed().await.unwrap());

    let svc = module.services();
    assert_eq!(svc.users.count_users().await.unwrap(), 5);
    let admin = svc.users.authenticate("admin", "admin123").await.unwrap();
    assert!(admin.is_admin());

    let a101 = svc.rooms.find_by_location("A", "101").await.unwrap();
    assert_eq!(a101.occupancy, 2);
    let c301 = svc.rooms.find_by_location("C", "301").await.unwrap();
    assert_eq!(c301.occupancy, 1);
}

#[tokio::test]
async fn tickets_filter_by_request_time() {
    let module = setup().await;
    let svc = module.services();
    let s = student(&svc, "uma", "2024027").await;
    let r = room(&svc, "A", "102", 4).await;

    let mut tickets = Vec::new();
    for description in ["leaking tap", "broken lamp", "stuck window"] {
        let t = svc
            .repairs
            .create_ticket(NewRepairTicket {
                student_id: s.id,
                room_id: r.id,
                description: description.into(),
                repair_type: RepairType::Other,
                priority: RepairPriority::Medium,
            })
            .await
            .unwrap();
        tickets.push(t);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let between = |from, to| RepairFilter {
        requested_from: from,
        requested_to: to,
        ..RepairFilter::default()
    };
    let descriptions = |found: Vec<dormitory::contract::model::RepairTicket>| {
        found.into_iter().map(|t| t.description).collect::<Vec<_>>()
    };

    // Bounds are inclusive; newest first.
    let found = svc
        .repairs
        .list_tickets(between(Some(tickets[1].requested_at), Some(tickets[2].requested_at)))
        .await
        .unwrap();
    assert_eq!(descriptions(found), ["stuck window", "broken lamp"]);

    let found = svc
        .repairs
        .list_tickets(between(None, Some(tickets[0].requested_at)))
        .await
        .unwrap();
    assert_eq!(descriptions(found), ["leaking tap"]);

    let found = svc
        .repairs
        .list_tickets(between(Some(Utc::now()), None))
        .await
        .unwrap();
    assert!(found.is_empty());
}
