//! Repository Implementations
//!
//! PostgreSQL implementations of the domain collaborator traits.

mod ban_repository;
mod chat_repository;
mod message_repository;
mod user_log_repository;

pub use ban_repository::PgBanRepository;
pub use chat_repository::PgChatRepository;
pub use message_repository::PgMessageRepository;
pub use user_log_repository::PgUserLogRepository;
