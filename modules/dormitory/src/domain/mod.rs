pub mod error;
pub mod ports;
pub mod repos;
pub mod rules;
pub mod service;
