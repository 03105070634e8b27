//! Domain services.
//!
//! One service per aggregate. Each mutating method opens a transaction on
//! the shared connection, does its reads and writes through `&txn`, and
//! commits; an early `?` drops the transaction and rolls it back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::domain::error::DomainError;
use crate::domain::ports::PasswordHasher;
use crate::domain::repos::{
    AssignmentsRepository, RepairsRepository, RoomsRepository, UsersRepository,
};

mod assignments;
mod repairs;
mod rooms;
mod users;

pub use assignments::AssignmentsService;
pub use repairs::RepairsService;
pub use rooms::RoomsService;
pub use users::UsersService;

const MAX_TXN_ATTEMPTS: u32 = 6;
const INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

/// Re-run a whole transaction when it loses a lock race
/// ([`DomainError::Contention`]). Each attempt must open its own transaction.
/// Any other outcome, or the last attempt's contention, is returned as is.
pub(crate) async fn retry_on_contention<T, F, Fut>(mut attempt_txn: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut attempt = 1;
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match attempt_txn().await {
            Err(e) if e.is_contention() && attempt < MAX_TXN_ATTEMPTS => {
                tracing::debug!(attempt, error = %e, "Transaction lost a lock race, retrying");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

/// Configuration for the domain services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_username_length: usize,
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_username_length: 50,
            min_password_length: 6,
        }
    }
}

// DI Container - aggregates all domain services
pub struct AppServices<UR, RR, AR, TR>
where
    UR: UsersRepository + 'static,
    RR: RoomsRepository + 'static,
    AR: AssignmentsRepository + 'static,
    TR: RepairsRepository + 'static,
{
    pub users: UsersService<UR, AR, TR>,
    pub rooms: RoomsService<RR, AR, TR>,
    pub assignments: AssignmentsService<AR, UR, RR>,
    pub repairs: RepairsService<TR, UR, RR>,
}

impl<UR, RR, AR, TR> AppServices<UR, RR, AR, TR>
where
    UR: UsersRepository + 'static,
    RR: RoomsRepository + 'static,
    AR: AssignmentsRepository + 'static,
    TR: RepairsRepository + 'static,
{
    pub fn new(
        users_repo: UR,
        rooms_repo: RR,
        assignments_repo: AR,
        repairs_repo: TR,
        hasher: Arc<dyn PasswordHasher>,
        db: DatabaseConnection,
        config: ServiceConfig,
    ) -> Self {
        let users_repo = Arc::new(users_repo);
        let rooms_repo = Arc::new(rooms_repo);
        let assignments_repo = Arc::new(assignments_repo);
        let repairs_repo = Arc::new(repairs_repo);

        Self {
            users: UsersService::new(
                Arc::clone(&users_repo),
                Arc::clone(&assignments_repo),
                Arc::clone(&repairs_repo),
                hasher,
                db.clone(),
                config,
            ),
            rooms: RoomsService::new(
                Arc::clone(&rooms_repo),
                Arc::clone(&assignments_repo),
                Arc::clone(&repairs_repo),
                db.clone(),
            ),
            assignments: AssignmentsService::new(
                Arc::clone(&assignments_repo),
                Arc::clone(&users_repo),
                Arc::clone(&rooms_repo),
                db.clone(),
            ),
            repairs: RepairsService::new(repairs_repo, users_repo, rooms_repo, db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn contention_is_retried_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let out = retry_on_contention(|| async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DomainError::contention("database is locked"))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(out, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_and_exhausted_attempts_are_returned() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let out: Result<(), _> = retry_on_contention(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::rejected("room is full"))
        })
        .await;
        assert_eq!(out, Err(DomainError::rejected("room is full")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        calls.store(0, Ordering::SeqCst);
        let out: Result<(), _> = retry_on_contention(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::contention("database is locked"))
        })
        .await;
        assert!(out.unwrap_err().is_contention());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_TXN_ATTEMPTS);
    }
}
