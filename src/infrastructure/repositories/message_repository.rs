//! Message Repository Implementation
//!
//! PostgreSQL persistence for chat messages. Rows are written exactly as
//! handed over by the pipeline: the content column already holds the
//! encrypted token by the time it reaches this layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Message, MessageRepository};
use crate::shared::error::AppError;

/// PostgreSQL message repository.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    chat_id: String,
    user_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            chat_id: self.chat_id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn save(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, chat_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, chat_id, user_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(&message.chat_id)
        .bind(&message.user_id)
        .bind(&message.content)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }
}
