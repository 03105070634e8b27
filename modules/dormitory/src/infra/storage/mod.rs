//! SeaORM persistence: entities, row mappers, repository implementations and
//! the schema migrator. Nothing outside this module touches SeaORM models.

pub mod assignments_sea_repo;
pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repairs_sea_repo;
pub mod rooms_sea_repo;
pub mod users_sea_repo;

pub use assignments_sea_repo::OrmAssignmentsRepository;
pub use repairs_sea_repo::OrmRepairsRepository;
pub use rooms_sea_repo::OrmRoomsRepository;
pub use users_sea_repo::OrmUsersRepository;

use crate::domain::error::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    let err = DomainError::from(e);
    if err.is_contention() {
        tracing::debug!(error = %err, "lock conflict");
    } else {
        tracing::error!(error = %err, "database error");
    }
    err
}
