//! # Domain Entities
//!
//! - **Message**: a chat message; at rest its content is always ciphertext
//! - **Identity**: the resolved sender behind a connection credential
//! - **UserLog**: audit events for connection lifecycle transitions
//!
//! Each external collaborator has an associated trait here: ban lookup,
//! room metadata, message persistence, audit logging, identity resolution.

mod ban;
mod chat;
mod identity;
mod message;
mod user_log;

pub use ban::BanRepository;
pub use chat::ChatRepository;
pub use identity::{Identity, IdentityProvider};
pub use message::{Message, MessageRepository};
pub use user_log::{LogType, RelatedEntityType, UserLogRepository};

#[cfg(test)]
pub use ban::MockBanRepository;
#[cfg(test)]
pub use chat::MockChatRepository;
#[cfg(test)]
pub use identity::MockIdentityProvider;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use user_log::MockUserLogRepository;
