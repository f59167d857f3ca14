//! Audit log entity types and repository trait.
//!
//! Maps to the `user_logs` table. The chat core records exactly two
//! event types: connection established and connection closed.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Audit event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    ConnectionEstablished,
    ConnectionClosed,
}

impl LogType {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished => "connection_established",
            Self::ConnectionClosed => "connection_closed",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entity type the audit event relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedEntityType {
    Chat,
    User,
}

impl RelatedEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::User => "user",
        }
    }
}

/// Repository trait for audit log writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserLogRepository: Send + Sync {
    /// Record an audit event against a user and a related entity.
    async fn record(
        &self,
        user_id: &str,
        log_type: LogType,
        related_entity_id: &str,
        related_entity_type: RelatedEntityType,
    ) -> Result<(), AppError>;
}
