//! Repository ports.
//!
//! Every method takes the connection per call so the same repository works on
//! a pooled `DatabaseConnection` or inside a `DatabaseTransaction`.

pub mod assignments_repo;
pub mod repairs_repo;
pub mod rooms_repo;
pub mod users_repo;

pub use assignments_repo::AssignmentsRepository;
pub use repairs_repo::RepairsRepository;
pub use rooms_repo::RoomsRepository;
pub use users_repo::UsersRepository;
