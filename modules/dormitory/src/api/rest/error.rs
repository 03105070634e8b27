use axum::http::StatusCode;

use crate::api::problem::{Problem, ProblemResponse, ValidationError};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.dormitory.local/{code}"))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// 400 for a malformed request field that never reached the domain.
pub fn bad_field(field: &str, detail: impl Into<String>, instance: &str) -> ProblemResponse {
    let detail = detail.into();
    let mut resp = from_parts(
        StatusCode::BAD_REQUEST,
        "DORMITORY_VALIDATION",
        "Validation error",
        format!("{field}: {detail}"),
        instance,
    );
    resp.0 = resp.0.with_errors(vec![ValidationError {
        detail,
        pointer: format!("/{field}"),
    }]);
    resp
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "DORMITORY_NOT_FOUND",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::AlreadyExists { .. } => from_parts(
            StatusCode::CONFLICT,
            "DORMITORY_CONFLICT",
            "Already exists",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { field, message } => bad_field(field, message.clone(), instance),
        DomainError::Rejected { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "DORMITORY_REJECTED",
            "Operation rejected",
            message.clone(),
            instance,
        ),
        DomainError::InvalidState { .. } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "DORMITORY_INVALID_STATE",
            "Invalid state transition",
            e.to_string(),
            instance,
        ),
        DomainError::Contention { .. } => from_parts(
            StatusCode::CONFLICT,
            "DORMITORY_CONCURRENT_UPDATE",
            "Concurrent update",
            "The resource was changed by another request; retry the operation",
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DORMITORY_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_per_error_kind() {
        let cases = [
            (DomainError::not_found("Room", "x"), 404),
            (DomainError::already_exists("User", "username", "alice"), 409),
            (DomainError::validation("email", "bad"), 400),
            (DomainError::rejected("room is full"), 400),
            (DomainError::invalid_state("RepairTicket", "not pending"), 422),
            (DomainError::contention("database is locked"), 409),
            (DomainError::database("disk I/O error"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(map_domain_error(&err, "/x").0.status, status, "{err}");
        }
    }

    #[test]
    fn internal_details_stay_hidden() {
        let p = map_domain_error(&DomainError::database("SQLITE_BUSY at row 7"), "/rooms").0;
        assert!(!p.detail.contains("SQLITE_BUSY"));
        assert_eq!(p.instance, "/rooms");
    }

    #[test]
    fn validation_carries_pointer() {
        let p = map_domain_error(&DomainError::validation("capacity", "must be > 0"), "/rooms").0;
        let errors = p.errors.unwrap();
        assert_eq!(errors[0].pointer, "/capacity");
    }
}
