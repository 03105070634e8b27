use thiserror::Error;

use crate::domain::error::DomainError;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DormitoryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Internal error")]
    Internal,
}

impl DormitoryError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<DomainError> for DormitoryError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { entity, key } => Self::NotFound { entity, key },
            DomainError::Database { .. } => Self::Internal,
            other => Self::InvalidOperation {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_collapse_to_three_kinds() {
        assert_eq!(
            DormitoryError::from(DomainError::not_found("Room", "A-101")),
            DormitoryError::not_found("Room", "A-101")
        );
        assert_eq!(
            DormitoryError::from(DomainError::database("disk I/O error")),
            DormitoryError::Internal
        );
        let err = DormitoryError::from(DomainError::rejected("room is full"));
        assert!(matches!(err, DormitoryError::InvalidOperation { message } if message.contains("room is full")));
    }
}
