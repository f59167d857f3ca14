//! Audit Log Repository Implementation
//!
//! PostgreSQL append-only writes of connection lifecycle events.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{LogType, RelatedEntityType, UserLogRepository};
use crate::shared::error::AppError;

/// PostgreSQL audit log repository.
pub struct PgUserLogRepository {
    pool: PgPool,
}

impl PgUserLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserLogRepository for PgUserLogRepository {
    async fn record(
        &self,
        user_id: &str,
        log_type: LogType,
        related_entity_id: &str,
        related_entity_type: RelatedEntityType,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_logs (id, user_id, log_type, related_entity_id, related_entity_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(log_type.as_str())
        .bind(related_entity_id)
        .bind(related_entity_type.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
