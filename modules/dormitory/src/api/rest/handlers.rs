use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::problem::{Problem, ProblemResponse};
use crate::api::rest::dto::{
    AssignReq, AssignRepairReq, AssignmentDto, AssignmentListDto, CancelReq, ChangePasswordReq,
    CheckOutReq, CompleteRepairReq, CreateRepairReq, CreateRoomReq, CreateUserReq,
    ListAssignmentsQuery, ListRepairsQuery, ListRoomsQuery, ListUsersQuery, OverdueQuery,
    RepairListDto, RepairTicketDto, RoomDto, RoomListDto, UpdateRepairReq, UpdateRoomReq,
    UpdateUserReq, UserDto, UserListDto,
};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::NewAssignment;
use crate::domain::error::DomainError;
use crate::module::ConcreteAppServices;

type Svc = Extension<Arc<ConcreteAppServices>>;

fn fail(e: DomainError, uri: &Uri) -> ProblemResponse {
    match &e {
        DomainError::Database { .. } => error!("Request failed: {}", e),
        _ => info!("Request rejected: {}", e),
    }
    map_domain_error(&e, uri.path())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListDto),
        (status = 400, description = "Bad filter", body = Problem),
    )
)]
pub async fn list_users(
    Extension(svc): Svc,
    Query(query): Query<ListUsersQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<UserListDto>, ProblemResponse> {
    let filter = query.try_into().map_err(|e| fail(e, &uri))?;
    let users = svc.users.list_users(filter).await.map_err(|e| fail(e, &uri))?;
    let users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(UserListDto {
        total: users.len(),
        users,
    }))
}

/// Students without an active assignment
#[utoipa::path(
    get,
    path = "/users/unassigned",
    tag = "users",
    responses((status = 200, description = "Students without a room", body = UserListDto))
)]
pub async fn list_unassigned_students(
    Extension(svc): Svc,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<UserListDto>, ProblemResponse> {
    let users = svc
        .users
        .list_students_without_room()
        .await
        .map_err(|e| fail(e, &uri))?;
    let users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(UserListDto {
        total: users.len(),
        users,
    }))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn get_user(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.users.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 400, description = "Validation error", body = Problem),
        (status = 409, description = "Duplicate username, email or student number", body = Problem),
    )
)]
pub async fn create_user(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Json(req_body): Json<CreateUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Creating user: {}", req_body.username);

    let new_user = req_body.try_into().map_err(|e| fail(e, &uri))?;
    match svc.users.create_user(new_user).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Update a user with partial data
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not found", body = Problem),
        (status = 409, description = "Conflict", body = Problem),
    )
)]
pub async fn update_user(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateUserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.users.update_user(id, req_body.into()).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "User still referenced", body = Problem),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn delete_user(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<StatusCode, ProblemResponse> {
    svc.users.delete_user(id).await.map_err(|e| fail(e, &uri))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change a user's password
#[utoipa::path(
    post,
    path = "/users/{id}/password",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ChangePasswordReq,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password", body = Problem),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn change_password(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<ChangePasswordReq>,
) -> Result<StatusCode, ProblemResponse> {
    svc.users
        .change_password(id, &req_body.old_password, &req_body.new_password)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

/// List rooms
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    params(ListRoomsQuery),
    responses(
        (status = 200, description = "Matching rooms", body = RoomListDto),
        (status = 400, description = "Bad filter", body = Problem),
    )
)]
pub async fn list_rooms(
    Extension(svc): Svc,
    Query(query): Query<ListRoomsQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RoomListDto>, ProblemResponse> {
    let filter = query.try_into().map_err(|e| fail(e, &uri))?;
    let rooms = svc.rooms.list_rooms(filter).await.map_err(|e| fail(e, &uri))?;
    let rooms: Vec<RoomDto> = rooms.into_iter().map(RoomDto::from).collect();
    Ok(Json(RoomListDto {
        total: rooms.len(),
        rooms,
    }))
}

/// Get a room by ID
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room found", body = RoomDto),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn get_room(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RoomDto>, ProblemResponse> {
    match svc.rooms.get_room(id).await {
        Ok(room) => Ok(Json(RoomDto::from(room))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Create a room
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomReq,
    responses(
        (status = 201, description = "Created room", body = RoomDto),
        (status = 400, description = "Validation error", body = Problem),
        (status = 409, description = "Location already used", body = Problem),
    )
)]
pub async fn create_room(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Json(req_body): Json<CreateRoomReq>,
) -> Result<(StatusCode, Json<RoomDto>), ProblemResponse> {
    info!(
        "Creating room {}-{}",
        req_body.building_name, req_body.room_number
    );

    let new_room = req_body.try_into().map_err(|e| fail(e, &uri))?;
    match svc.rooms.create_room(new_room).await {
        Ok(room) => Ok((StatusCode::CREATED, Json(RoomDto::from(room)))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Update a room with partial data
#[utoipa::path(
    put,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("id" = Uuid, Path, description = "Room id")),
    request_body = UpdateRoomReq,
    responses(
        (status = 200, description = "Updated room", body = RoomDto),
        (status = 400, description = "Validation error", body = Problem),
        (status = 404, description = "Not found", body = Problem),
        (status = 409, description = "Location already used", body = Problem),
    )
)]
pub async fn update_room(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateRoomReq>,
) -> Result<Json<RoomDto>, ProblemResponse> {
    let patch = req_body.try_into().map_err(|e| fail(e, &uri))?;
    match svc.rooms.update_room(id, patch).await {
        Ok(room) => Ok(Json(RoomDto::from(room))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Delete a room
#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 400, description = "Room occupied or referenced", body = Problem),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn delete_room(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<StatusCode, ProblemResponse> {
    svc.rooms.delete_room(id).await.map_err(|e| fail(e, &uri))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active assignments in a room
#[utoipa::path(
    get,
    path = "/rooms/{id}/assignments",
    tag = "rooms",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 200, description = "Current residents", body = AssignmentListDto),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn room_residents(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<AssignmentListDto>, ProblemResponse> {
    svc.rooms.get_room(id).await.map_err(|e| fail(e, &uri))?;
    let found = svc
        .assignments
        .active_for_room(id)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(assignment_list(found)))
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

fn assignment_list(found: Vec<crate::contract::model::Assignment>) -> AssignmentListDto {
    let today = Utc::now().date_naive();
    let assignments: Vec<AssignmentDto> = found
        .into_iter()
        .map(|a| AssignmentDto::from_model(a, today))
        .collect();
    AssignmentListDto {
        total: assignments.len(),
        assignments,
    }
}

/// List assignments
#[utoipa::path(
    get,
    path = "/assignments",
    tag = "assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Matching assignments", body = AssignmentListDto),
        (status = 400, description = "Bad filter", body = Problem),
    )
)]
pub async fn list_assignments(
    Extension(svc): Svc,
    Query(query): Query<ListAssignmentsQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<AssignmentListDto>, ProblemResponse> {
    let filter = query.try_into().map_err(|e| fail(e, &uri))?;
    let found = svc
        .assignments
        .list_assignments(filter)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(assignment_list(found)))
}

/// Get an assignment by ID
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment found", body = AssignmentDto),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn get_assignment(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<AssignmentDto>, ProblemResponse> {
    let a = svc
        .assignments
        .get_assignment(id)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(AssignmentDto::from_model(a, Utc::now().date_naive())))
}

/// Assign a student to a room
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    request_body = AssignReq,
    responses(
        (status = 201, description = "Student assigned", body = AssignmentDto),
        (status = 400, description = "Room unavailable, full, or student already housed", body = Problem),
        (status = 404, description = "Student or room not found", body = Problem),
    )
)]
pub async fn assign_student(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Json(req_body): Json<AssignReq>,
) -> Result<(StatusCode, Json<AssignmentDto>), ProblemResponse> {
    info!(
        "Assigning student {} to room {}",
        req_body.student_id, req_body.room_id
    );

    let today = Utc::now().date_naive();
    let new = NewAssignment {
        student_id: req_body.student_id,
        room_id: req_body.room_id,
        check_in_date: req_body.check_in_date.unwrap_or(today),
        monthly_fee: req_body.monthly_fee,
    };
    match svc.assignments.assign(new).await {
        Ok(a) => Ok((StatusCode::CREATED, Json(AssignmentDto::from_model(a, today)))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Cancel an active assignment
#[utoipa::path(
    post,
    path = "/assignments/{id}/cancel",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body = CancelReq,
    responses(
        (status = 200, description = "Assignment cancelled", body = AssignmentDto),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Assignment is not active", body = Problem),
    )
)]
pub async fn cancel_assignment(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<CancelReq>,
) -> Result<Json<AssignmentDto>, ProblemResponse> {
    let a = svc
        .assignments
        .cancel(id, &req_body.reason)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(AssignmentDto::from_model(a, Utc::now().date_naive())))
}

/// Check a student out of their room
#[utoipa::path(
    post,
    path = "/students/{id}/checkout",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Student id")),
    request_body = CheckOutReq,
    responses(
        (status = 200, description = "Checked out", body = AssignmentDto),
        (status = 404, description = "No active assignment", body = Problem),
    )
)]
pub async fn check_out_student(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(student_id): Path<Uuid>,
    Json(req_body): Json<CheckOutReq>,
) -> Result<Json<AssignmentDto>, ProblemResponse> {
    let today = Utc::now().date_naive();
    let date = req_body.check_out_date.unwrap_or(today);
    let a = svc
        .assignments
        .check_out(student_id, date)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(AssignmentDto::from_model(a, today)))
}

/// The student's active assignment
#[utoipa::path(
    get,
    path = "/students/{id}/assignment",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Active assignment", body = AssignmentDto),
        (status = 404, description = "No active assignment", body = Problem),
    )
)]
pub async fn student_assignment(
    Extension(svc): Svc,
    Path(student_id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<AssignmentDto>, ProblemResponse> {
    let found = svc
        .assignments
        .active_for_student(student_id)
        .await
        .map_err(|e| fail(e, &uri))?
        .ok_or_else(|| {
            fail(
                DomainError::not_found("Assignment", format!("active for student {student_id}")),
                &uri,
            )
        })?;
    Ok(Json(AssignmentDto::from_model(found, Utc::now().date_naive())))
}

// ---------------------------------------------------------------------------
// Repairs
// ---------------------------------------------------------------------------

/// List repair tickets, newest first
#[utoipa::path(
    get,
    path = "/repairs",
    tag = "repairs",
    params(ListRepairsQuery),
    responses(
        (status = 200, description = "Matching tickets", body = RepairListDto),
        (status = 400, description = "Bad filter", body = Problem),
    )
)]
pub async fn list_repairs(
    Extension(svc): Svc,
    Query(query): Query<ListRepairsQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepairListDto>, ProblemResponse> {
    let filter = query.try_into().map_err(|e| fail(e, &uri))?;
    let found = svc
        .repairs
        .list_tickets(filter)
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(found.into()))
}

/// Pending tickets in service order
#[utoipa::path(
    get,
    path = "/repairs/queue",
    tag = "repairs",
    responses((status = 200, description = "URGENT > HIGH > MEDIUM > LOW, oldest first", body = RepairListDto))
)]
pub async fn repair_queue(
    Extension(svc): Svc,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepairListDto>, ProblemResponse> {
    let found = svc.repairs.pending_queue().await.map_err(|e| fail(e, &uri))?;
    Ok(Json(found.into()))
}

/// URGENT and HIGH pending tickets
#[utoipa::path(
    get,
    path = "/repairs/high-priority",
    tag = "repairs",
    responses((status = 200, description = "High-priority pending tickets", body = RepairListDto))
)]
pub async fn high_priority_repairs(
    Extension(svc): Svc,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepairListDto>, ProblemResponse> {
    let found = svc
        .repairs
        .high_priority_pending()
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(found.into()))
}

/// Tickets being worked on
#[utoipa::path(
    get,
    path = "/repairs/in-progress",
    tag = "repairs",
    responses((status = 200, description = "In-progress tickets", body = RepairListDto))
)]
pub async fn in_progress_repairs(
    Extension(svc): Svc,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepairListDto>, ProblemResponse> {
    let found = svc.repairs.in_progress().await.map_err(|e| fail(e, &uri))?;
    Ok(Json(found.into()))
}

/// Open tickets older than `days`
#[utoipa::path(
    get,
    path = "/repairs/overdue",
    tag = "repairs",
    params(OverdueQuery),
    responses((status = 200, description = "Overdue tickets, oldest first", body = RepairListDto))
)]
pub async fn overdue_repairs(
    Extension(svc): Svc,
    Query(query): Query<OverdueQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepairListDto>, ProblemResponse> {
    let found = svc
        .repairs
        .overdue(query.days.unwrap_or(7))
        .await
        .map_err(|e| fail(e, &uri))?;
    Ok(Json(found.into()))
}

/// Get a repair ticket by ID
#[utoipa::path(
    get,
    path = "/repairs/{id}",
    tag = "repairs",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket found", body = RepairTicketDto),
        (status = 404, description = "Not found", body = Problem),
    )
)]
pub async fn get_repair(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepairTicketDto>, ProblemResponse> {
    match svc.repairs.get_ticket(id).await {
        Ok(t) => Ok(Json(t.into())),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// File a repair ticket
#[utoipa::path(
    post,
    path = "/repairs",
    tag = "repairs",
    request_body = CreateRepairReq,
    responses(
        (status = 201, description = "Ticket filed", body = RepairTicketDto),
        (status = 400, description = "Validation error or requester is not a student", body = Problem),
        (status = 404, description = "Student or room not found", body = Problem),
    )
)]
pub async fn create_repair(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Json(req_body): Json<CreateRepairReq>,
) -> Result<(StatusCode, Json<RepairTicketDto>), ProblemResponse> {
    let new = req_body.try_into().map_err(|e| fail(e, &uri))?;
    match svc.repairs.create_ticket(new).await {
        Ok(t) => Ok((StatusCode::CREATED, Json(t.into()))),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Edit a pending ticket
#[utoipa::path(
    put,
    path = "/repairs/{id}",
    tag = "repairs",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = UpdateRepairReq,
    responses(
        (status = 200, description = "Updated ticket", body = RepairTicketDto),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Ticket is no longer pending", body = Problem),
    )
)]
pub async fn update_repair(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateRepairReq>,
) -> Result<Json<RepairTicketDto>, ProblemResponse> {
    let patch = req_body.try_into().map_err(|e| fail(e, &uri))?;
    match svc.repairs.update_ticket(id, patch).await {
        Ok(t) => Ok(Json(t.into())),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Delete a pending ticket
#[utoipa::path(
    delete,
    path = "/repairs/{id}",
    tag = "repairs",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Ticket is no longer pending", body = Problem),
    )
)]
pub async fn delete_repair(
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    OriginalUri(uri): OriginalUri,
) -> Result<StatusCode, ProblemResponse> {
    svc.repairs.delete_ticket(id).await.map_err(|e| fail(e, &uri))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hand a pending ticket to an admin
#[utoipa::path(
    post,
    path = "/repairs/{id}/assign",
    tag = "repairs",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = AssignRepairReq,
    responses(
        (status = 200, description = "Ticket in progress", body = RepairTicketDto),
        (status = 400, description = "Target user is not an admin", body = Problem),
        (status = 404, description = "Ticket or admin not found", body = Problem),
        (status = 422, description = "Ticket is not pending", body = Problem),
    )
)]
pub async fn assign_repair(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<AssignRepairReq>,
) -> Result<Json<RepairTicketDto>, ProblemResponse> {
    match svc.repairs.assign(id, req_body.admin_id).await {
        Ok(t) => Ok(Json(t.into())),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Complete an in-progress ticket
#[utoipa::path(
    post,
    path = "/repairs/{id}/complete",
    tag = "repairs",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = CompleteRepairReq,
    responses(
        (status = 200, description = "Ticket completed", body = RepairTicketDto),
        (status = 400, description = "Negative cost", body = Problem),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Ticket is not in progress", body = Problem),
    )
)]
pub async fn complete_repair(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<CompleteRepairReq>,
) -> Result<Json<RepairTicketDto>, ProblemResponse> {
    match svc.repairs.complete(id, req_body.notes, req_body.cost).await {
        Ok(t) => Ok(Json(t.into())),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Cancel an open ticket
#[utoipa::path(
    post,
    path = "/repairs/{id}/cancel",
    tag = "repairs",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = CancelReq,
    responses(
        (status = 200, description = "Ticket cancelled", body = RepairTicketDto),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Ticket already closed", body = Problem),
    )
)]
pub async fn cancel_repair(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Svc,
    Path(id): Path<Uuid>,
    Json(req_body): Json<CancelReq>,
) -> Result<Json<RepairTicketDto>, ProblemResponse> {
    match svc.repairs.cancel(id, &req_body.reason).await {
        Ok(t) => Ok(Json(t.into())),
        Err(e) => Err(fail(e, &uri)),
    }
}
