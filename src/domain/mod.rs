//! # Domain Layer
//!
//! Core entities of the chat pipeline and the collaborator traits it
//! consumes. Repository traits define the data-access contracts; the
//! infrastructure layer implements them.

pub mod entities;

pub use entities::*;
