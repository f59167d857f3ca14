//! Room metadata lookup trait.
//!
//! A room (`chat_id`) is an opaque grouping key; the only metadata the
//! pipeline needs is the language code used to pick a moderation
//! dictionary.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Repository trait for room metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Language code configured for the room, if the room is known.
    async fn language_code(&self, chat_id: &str) -> Result<Option<String>, AppError>;
}
