//! # Application Layer
//!
//! Services that implement the moderation policies applied to every
//! inbound message.

pub mod services;

pub use services::*;
