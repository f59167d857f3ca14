//! Infrastructure Layer
//!
//! Implementations for external collaborators:
//! - PostgreSQL repositories (bans, chats, messages, audit log)
//! - JWT identity resolution

pub mod auth;
pub mod database;
pub mod repositories;
