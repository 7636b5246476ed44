//! Delivery layers over the core engine

pub mod http;
