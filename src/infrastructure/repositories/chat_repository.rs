//! Chat Repository Implementation
//!
//! PostgreSQL lookup of room metadata. The pipeline only needs the
//! language code bound to a room, resolved through the languages table.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::ChatRepository;
use crate::shared::error::AppError;

/// PostgreSQL chat metadata repository.
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn language_code(&self, chat_id: &str) -> Result<Option<String>, AppError> {
        let code: Option<String> = sqlx::query_scalar(
            r#"
            SELECT l.code
            FROM chats c
            JOIN languages l ON l.id = c.language_id
            WHERE c.id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }
}
