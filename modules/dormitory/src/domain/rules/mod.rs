//! Lifecycle rules on the contract models.
//!
//! Everything here is pure: no I/O, the clock is passed in. Services load
//! rows, call into these methods, then persist whatever they return.

pub mod assignment;
pub mod repair;
pub mod room;
pub mod user;

pub use repair::sort_pending_queue;
