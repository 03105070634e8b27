//! Student dormitory administration: users, rooms, room assignments and
//! repair tickets.
//!
//! Layout:
//! - `contract`: public models, the [`DormitoryApi`] trait and its error type
//! - `domain`: business rules, repository ports and services
//! - `infra`: SeaORM storage and the Argon2 password hasher
//! - `api`: REST adapter (axum handlers, DTOs, RFC 9457 problems)
//! - `gateways`: in-process [`DormitoryApi`] client

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;
pub mod module;
mod seed;

pub use config::DormitoryConfig;
pub use contract::{DormitoryApi, DormitoryError};
pub use module::{migrate, ConcreteAppServices, Dormitory};
