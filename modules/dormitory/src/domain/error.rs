use sea_orm::sqlx;
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} with {field} '{value}' already exists")]
    AlreadyExists {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} is in the wrong state: {message}")]
    InvalidState {
        entity: &'static str,
        message: String,
    },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    /// Lost a lock race with a concurrent transaction; safe to run again.
    #[error("Concurrent update: {message}")]
    Contention { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(entity: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidState {
            entity,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn contention(message: impl Into<String>) -> Self {
        Self::Contention {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn is_contention(&self) -> bool {
        matches!(self, Self::Contention { .. })
    }
}

/// SQLSTATE / SQLite result codes that mean "another transaction got there first".
fn is_contention_code(code: &str) -> bool {
    match code {
        // serialization_failure, deadlock_detected, lock_not_available
        "40001" | "40P01" | "55P03" => true,
        // SQLITE_BUSY / SQLITE_LOCKED; extended codes keep the primary code in the low byte
        _ => code.len() <= 4 && code.parse::<u32>().is_ok_and(|c| matches!(c & 0xff, 5 | 6)),
    }
}

fn is_contention(e: &DbErr) -> bool {
    let runtime = match e {
        DbErr::Conn(r) | DbErr::Exec(r) | DbErr::Query(r) => r,
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => {
            db.code().is_some_and(|code| is_contention_code(&code))
        }
        _ => false,
    }
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        if is_contention(&e) {
            Self::contention(e.to_string())
        } else {
            Self::database(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_conflict_codes() {
        for code in ["5", "6", "517", "261", "40001", "40P01", "55P03"] {
            assert!(is_contention_code(code), "{code}");
        }
        // SQLITE_CONSTRAINT_UNIQUE, unique_violation, foreign_key_violation
        for code in ["2067", "19", "23505", "23503"] {
            assert!(!is_contention_code(code), "{code}");
        }
    }

    #[test]
    fn non_driver_errors_are_plain_database_errors() {
        let e = DomainError::from(DbErr::Custom("boom".into()));
        assert!(matches!(e, DomainError::Database { .. }));
        assert!(!e.is_contention());
    }
}
