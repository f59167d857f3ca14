//! HTTP Routes

pub mod handlers;
pub mod routes;
