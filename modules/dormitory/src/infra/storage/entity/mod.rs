pub mod assignment;
pub mod repair_ticket;
pub mod room;
pub mod user;
