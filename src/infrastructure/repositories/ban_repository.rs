//! Ban Repository Implementation
//!
//! PostgreSQL-backed lookup against the global ban list. The moderation
//! gate calls this once per inbound message, so the query stays a single
//! indexed EXISTS.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::BanRepository;
use crate::shared::error::AppError;

/// PostgreSQL ban list repository.
pub struct PgBanRepository {
    pool: PgPool,
}

impl PgBanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanRepository for PgBanRepository {
    async fn is_globally_banned(&self, user_id: &str) -> Result<bool, AppError> {
        let banned: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bans WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(banned)
    }
}
