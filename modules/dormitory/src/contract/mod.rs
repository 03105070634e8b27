pub mod client;
pub mod error;
pub mod model;

pub use client::DormitoryApi;
pub use error::DormitoryError;
