//! Presentation Layer
//!
//! HTTP routes and the WebSocket chat core.

pub mod http;
pub mod middleware;
pub mod websocket;
