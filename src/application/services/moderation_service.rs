//! Moderation Gate
//!
//! Synchronous ban check applied to every inbound message before anything
//! is persisted or broadcast. Always a fresh lookup: ban state must take
//! effect on the very next message, so there is no caching. A lookup
//! failure propagates to the caller and is never treated as "allowed".

use std::sync::Arc;

use crate::domain::BanRepository;
use crate::shared::error::AppError;

/// Gate that checks senders against the global ban list.
pub struct ModerationGate {
    bans: Arc<dyn BanRepository>,
}

impl ModerationGate {
    pub fn new(bans: Arc<dyn BanRepository>) -> Self {
        Self { bans }
    }

    /// Whether the sender may post. `Err` means the lookup itself failed.
    pub async fn is_allowed(&self, user_id: &str) -> Result<bool, AppError> {
        let banned = self.bans.is_globally_banned(user_id).await?;
        Ok(!banned)
    }
}
