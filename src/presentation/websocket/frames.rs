//! WebSocket Frame Types
//!
//! JSON frames exchanged with chat clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Frame keys injected by the server. Caller-supplied fields with these
/// names are dropped from the passthrough set so they can never spoof
/// envelope data.
pub const ENVELOPE_KEYS: &[&str] = &[
    "userId",
    "username",
    "chatId",
    "createdAt",
    "messageId",
    "content",
    "role",
];

/// Inbound message frame.
///
/// Only `content` is required; any additional caller-supplied fields are
/// carried through to the broadcast frame untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub content: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outbound broadcast frame delivered to every open session of a room.
///
/// `content` carries the filtered display text, never the stored
/// (encrypted) original.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastFrame {
    pub user_id: String,
    pub username: String,
    pub chat_id: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub message_id: Uuid,
    pub content: String,
    pub role: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Structured error frame sent to a single session.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub code: &'static str,
    pub message: &'static str,
}

impl ErrorFrame {
    /// Error sent back to a globally banned sender.
    pub fn user_banned() -> Self {
        Self {
            kind: "error",
            code: "USER_BANNED",
            message: "You are banned from the platform.",
        }
    }
}
