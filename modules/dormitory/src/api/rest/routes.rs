use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::problem::{Problem, ValidationError};
use crate::api::rest::{dto, handlers};
use crate::module::ConcreteAppServices;

/// Mount point of every dormitory endpoint.
pub const BASE_PATH: &str = "/dormitory/v1";

#[derive(OpenApi)]
#[openapi(
    info(title = "Dormitory administration API", version = "1.0.0"),
    servers((url = "/dormitory/v1")),
    paths(
        handlers::list_users,
        handlers::list_unassigned_students,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::change_password,
        handlers::list_rooms,
        handlers::get_room,
        handlers::create_room,
        handlers::update_room,
        handlers::delete_room,
        handlers::room_residents,
        handlers::list_assignments,
        handlers::get_assignment,
        handlers::assign_student,
        handlers::cancel_assignment,
        handlers::check_out_student,
        handlers::student_assignment,
        handlers::list_repairs,
        handlers::repair_queue,
        handlers::high_priority_repairs,
        handlers::in_progress_repairs,
        handlers::overdue_repairs,
        handlers::get_repair,
        handlers::create_repair,
        handlers::update_repair,
        handlers::delete_repair,
        handlers::assign_repair,
        handlers::complete_repair,
        handlers::cancel_repair,
    ),
    components(schemas(
        Problem,
        ValidationError,
        dto::UserDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        dto::ChangePasswordReq,
        dto::UserListDto,
        dto::RoomDto,
        dto::CreateRoomReq,
        dto::UpdateRoomReq,
        dto::RoomListDto,
        dto::AssignmentDto,
        dto::AssignReq,
        dto::CheckOutReq,
        dto::CancelReq,
        dto::AssignmentListDto,
        dto::RepairTicketDto,
        dto::CreateRepairReq,
        dto::UpdateRepairReq,
        dto::AssignRepairReq,
        dto::CompleteRepairReq,
        dto::RepairListDto,
    )),
    tags(
        (name = "users", description = "Students and administrators"),
        (name = "rooms", description = "Rooms and their occupancy"),
        (name = "assignments", description = "Check-in, check-out and cancellation"),
        (name = "repairs", description = "Repair tickets and the service queue"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Attach the dormitory endpoints to `router` under [`BASE_PATH`].
pub fn register_routes(
    router: Router,
    services: Arc<ConcreteAppServices>,
) -> anyhow::Result<Router> {
    let api = Router::new()
        // Users
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/unassigned", get(handlers::list_unassigned_students))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/users/{id}/password", post(handlers::change_password))
        // Rooms
        .route("/rooms", get(handlers::list_rooms).post(handlers::create_room))
        .route(
            "/rooms/{id}",
            get(handlers::get_room)
                .put(handlers::update_room)
                .delete(handlers::delete_room),
        )
        .route("/rooms/{id}/assignments", get(handlers::room_residents))
        // Assignments
        .route(
            "/assignments",
            get(handlers::list_assignments).post(handlers::assign_student),
        )
        .route("/assignments/{id}", get(handlers::get_assignment))
        .route("/assignments/{id}/cancel", post(handlers::cancel_assignment))
        .route("/students/{id}/checkout", post(handlers::check_out_student))
        .route("/students/{id}/assignment", get(handlers::student_assignment))
        // Repairs
        .route("/repairs", get(handlers::list_repairs).post(handlers::create_repair))
        .route("/repairs/queue", get(handlers::repair_queue))
        .route("/repairs/high-priority", get(handlers::high_priority_repairs))
        .route("/repairs/in-progress", get(handlers::in_progress_repairs))
        .route("/repairs/overdue", get(handlers::overdue_repairs))
        .route(
            "/repairs/{id}",
            get(handlers::get_repair)
                .put(handlers::update_repair)
                .delete(handlers::delete_repair),
        )
        .route("/repairs/{id}/assign", post(handlers::assign_repair))
        .route("/repairs/{id}/complete", post(handlers::complete_repair))
        .route("/repairs/{id}/cancel", post(handlers::cancel_repair))
        .route("/openapi.json", get(openapi_json))
        .layer(Extension(services));

    Ok(router.nest(BASE_PATH, api))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/users",
            "/users/{id}/password",
            "/rooms/{id}/assignments",
            "/students/{id}/checkout",
            "/repairs/queue",
            "/repairs/{id}/complete",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
