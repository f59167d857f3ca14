//! Application Services

pub mod filter_service;
pub mod moderation_service;

pub use filter_service::ProfanityFilter;
pub use moderation_service::ModerationGate;
