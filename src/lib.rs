//! # AnonChat Server Library
//!
//! Anonymous room-based chat service: long-lived WebSocket connections
//! are bound to a room, and every inbound message passes a moderation
//! gate, a profanity filter, at-rest encryption and a room broadcast.
//!
//! ## Module Structure
//!
//! ```text
//! anonchat_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities and collaborator traits
//! +-- application/    Moderation gate and profanity filter
//! +-- infrastructure/ Database repositories and JWT identity
//! +-- presentation/   HTTP routes and the WebSocket chat core
//! +-- shared/         Errors and the encryption adapter
//! ```

// Configuration module
pub mod config;

// Domain layer - entities and collaborator contracts
pub mod domain;

// Application layer - moderation services
pub mod application;

// Infrastructure layer - external implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
