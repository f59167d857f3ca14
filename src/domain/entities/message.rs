//! Message entity and repository trait.
//!
//! Maps to the `messages` table. The `content` column always holds the
//! base64 AEAD token produced by the encryption adapter; plaintext never
//! reaches storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A stored chat message.
///
/// Maps to the `messages` table:
/// - id: UUID PRIMARY KEY
/// - chat_id: TEXT NOT NULL (opaque room identifier)
/// - user_id: TEXT NOT NULL (opaque sender identifier)
/// - content: TEXT NOT NULL (encrypted at rest)
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Server-generated message id
    pub id: Uuid,

    /// Room the message belongs to
    pub chat_id: String,

    /// Sender user id
    pub user_id: String,

    /// Message content (ciphertext token at rest)
    pub content: String,

    /// Server timestamp at envelope construction
    pub created_at: DateTime<Utc>,
}

/// Repository trait for message persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message and return the stored record.
    async fn save(&self, message: &Message) -> Result<Message, AppError>;
}
