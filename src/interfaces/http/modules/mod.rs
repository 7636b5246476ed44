//! One directory per API area

pub mod auth;
pub mod collections;
pub mod forms;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod uploads;
