//! Ban lookup trait.
//!
//! The chat core only ever queries the ban list; ban records are created
//! and lifted through the administrative surface, which is out of scope.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Repository trait for the global ban list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BanRepository: Send + Sync {
    /// Check whether the user has at least one active global ban.
    async fn is_globally_banned(&self, user_id: &str) -> Result<bool, AppError>;
}
