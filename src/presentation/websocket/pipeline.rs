//! Message Pipeline
//!
//! Runs every inbound message through the moderation gate, the profanity
//! filter, at-rest encryption and room fan-out, synchronously on the
//! sending connection's task. One sender's messages are therefore
//! processed in submission order; no ordering holds across senders.
//!
//! Two content values flow through a single invocation and must never be
//! conflated: the broadcast frame carries the filtered display text,
//! while storage receives the unfiltered original, encrypted.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::broadcast::Broadcaster;
use super::frames::{BroadcastFrame, ErrorFrame, InboundMessage, ENVELOPE_KEYS};
use super::registry::ChatSession;
use crate::application::services::{ModerationGate, ProfanityFilter};
use crate::domain::{ChatRepository, Message, MessageRepository};
use crate::shared::crypto::{CryptoError, EncryptionAdapter};
use crate::shared::error::AppError;

/// Language code used when the room has no resolvable language.
const DEFAULT_LANGUAGE_CODE: &str = "UNK";

/// Per-message pipeline errors. All of these are fatal for the
/// invocation: the message is neither persisted nor broadcast, and the
/// caller decides the connection's fate.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Malformed message frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    #[error("Content encryption failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Failed to encode broadcast frame: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Collaborator(#[from] AppError),
}

/// The per-message processing pipeline.
///
/// All collaborators are injected at construction; the pipeline itself
/// holds no mutable state and is shared across connections behind an
/// `Arc`.
pub struct MessagePipeline {
    gate: ModerationGate,
    filter: Arc<ProfanityFilter>,
    crypto: Arc<EncryptionAdapter>,
    messages: Arc<dyn MessageRepository>,
    chats: Arc<dyn ChatRepository>,
    broadcaster: Broadcaster,
}

impl MessagePipeline {
    pub fn new(
        gate: ModerationGate,
        filter: Arc<ProfanityFilter>,
        crypto: Arc<EncryptionAdapter>,
        messages: Arc<dyn MessageRepository>,
        chats: Arc<dyn ChatRepository>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            gate,
            filter,
            crypto,
            messages,
            chats,
            broadcaster,
        }
    }

    /// Process one inbound text frame from `session`.
    ///
    /// A banned sender gets a structured error frame and `Ok(())`: the
    /// connection stays open and nothing is persisted or broadcast. Every
    /// other failure returns `Err` without partial effects visible to
    /// other sessions.
    pub async fn process(&self, session: &ChatSession, raw: &str) -> Result<(), PipelineError> {
        if !self.gate.is_allowed(&session.user_id).await? {
            tracing::info!(
                user_id = %session.user_id,
                chat_id = %session.chat_id,
                "Rejected message from banned user"
            );
            session.send_json(&ErrorFrame::user_banned());
            return Ok(());
        }

        let inbound: InboundMessage = serde_json::from_str(raw)?;

        // Server-built envelope: id and timestamp are always generated
        // here, never taken from the client.
        let message_id = Uuid::new_v4();
        let created_at = Utc::now();

        let language_code = self
            .chats
            .language_code(&session.chat_id)
            .await?
            .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string());

        let display_content = self.filter.filter(&inbound.content, &language_code);

        let stored = self
            .messages
            .save(&Message {
                id: message_id,
                chat_id: session.chat_id.clone(),
                user_id: session.user_id.clone(),
                content: self.crypto.encrypt(&inbound.content)?,
                created_at,
            })
            .await?;

        let mut extra = inbound.extra;
        for key in ENVELOPE_KEYS {
            extra.remove(*key);
        }

        let frame = BroadcastFrame {
            user_id: session.user_id.clone(),
            username: session.username.clone(),
            chat_id: stored.chat_id,
            created_at: stored.created_at.timestamp_millis(),
            message_id: stored.id,
            content: display_content,
            role: session.role.clone(),
            extra,
        };

        let delivered = self
            .broadcaster
            .broadcast(&session.chat_id, &frame)
            .map_err(PipelineError::Encode)?;

        tracing::debug!(
            chat_id = %session.chat_id,
            message_id = %frame.message_id,
            delivered,
            "Message persisted and broadcast"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, MockBanRepository, MockChatRepository, MockMessageRepository};
    use crate::presentation::websocket::registry::SessionRegistry;
    use axum::extract::ws::Message as WsMessage;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct TestRoom {
        registry: Arc<SessionRegistry>,
        saved: Arc<Mutex<Vec<Message>>>,
        crypto: Arc<EncryptionAdapter>,
    }

    struct PipelineBuilder {
        banned: bool,
        ban_outage: bool,
        save_outage: bool,
        language: Option<String>,
        words: Vec<&'static str>,
    }

    impl Default for PipelineBuilder {
        fn default() -> Self {
            Self {
                banned: false,
                ban_outage: false,
                save_outage: false,
                language: Some("eng".to_string()),
                words: vec!["badword"],
            }
        }
    }

    impl PipelineBuilder {
        fn build(self) -> (MessagePipeline, TestRoom) {
            let mut bans = MockBanRepository::new();
            if self.ban_outage {
                bans.expect_is_globally_banned()
                    .returning(|_| Err(AppError::Internal("ban store unreachable".into())));
            } else {
                let banned = self.banned;
                bans.expect_is_globally_banned().returning(move |_| Ok(banned));
            }

            let mut chats = MockChatRepository::new();
            let language = self.language.clone();
            chats
                .expect_language_code()
                .returning(move |_| Ok(language.clone()));

            let saved: Arc<Mutex<Vec<Message>>> = Arc::new(Mutex::new(Vec::new()));
            let mut messages = MockMessageRepository::new();
            if self.save_outage {
                messages
                    .expect_save()
                    .returning(|_| Err(AppError::Internal("message store unreachable".into())));
            } else if self.banned || self.ban_outage {
                messages.expect_save().times(0);
            } else {
                let saved_ref = saved.clone();
                messages.expect_save().returning(move |m| {
                    saved_ref.lock().unwrap().push(m.clone());
                    Ok(m.clone())
                });
            }

            let mut dictionaries = HashMap::new();
            dictionaries.insert(
                "eng".to_string(),
                self.words.iter().map(|w| w.to_string()).collect(),
            );
            let filter = Arc::new(ProfanityFilter::from_dictionaries(dictionaries));

            let crypto = Arc::new(EncryptionAdapter::new("pipeline-test-secret"));
            let registry = Arc::new(SessionRegistry::new());

            let pipeline = MessagePipeline::new(
                ModerationGate::new(Arc::new(bans)),
                filter,
                crypto.clone(),
                Arc::new(messages),
                Arc::new(chats),
                Broadcaster::new(registry.clone()),
            );

            (
                pipeline,
                TestRoom {
                    registry,
                    saved,
                    crypto,
                },
            )
        }
    }

    fn join(
        room: &TestRoom,
        chat_id: &str,
        session_id: &str,
        user_id: &str,
    ) -> (Arc<ChatSession>, mpsc::UnboundedReceiver<WsMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(ChatSession::new(
            session_id.to_string(),
            chat_id.to_string(),
            Identity {
                user_id: user_id.to_string(),
                username: format!("name-of-{user_id}"),
                role: "USER".to_string(),
            },
            tx,
        ));
        room.registry.register(session.clone());
        (session, rx)
    }

    fn recv_json(rx: &mut mpsc::UnboundedReceiver<WsMessage>) -> Value {
        match rx.try_recv().expect("expected a frame") {
            WsMessage::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn message_reaches_every_session_in_the_room() {
        let (pipeline, room) = PipelineBuilder::default().build();
        let (sender, mut rx1) = join(&room, "chat123", "s1", "u1");
        let (_other, mut rx2) = join(&room, "chat123", "s2", "u2");

        pipeline
            .process(&sender, r#"{"content":"hello"}"#)
            .await
            .unwrap();

        for rx in [&mut rx1, &mut rx2] {
            let frame = recv_json(rx);
            assert_eq!(frame["chatId"], json!("chat123"));
            assert_eq!(frame["content"], json!("hello"));
            assert_eq!(frame["userId"], json!("u1"));
            assert_eq!(frame["username"], json!("name-of-u1"));
            assert_eq!(frame["role"], json!("USER"));
            assert!(frame["messageId"].is_string());
            assert!(frame["createdAt"].is_i64());
        }
    }

    #[tokio::test]
    async fn banned_sender_gets_error_and_nothing_is_persisted() {
        let (pipeline, room) = PipelineBuilder {
            banned: true,
            ..Default::default()
        }
        .build();
        let (sender, mut sender_rx) = join(&room, "chat123", "s1", "banned-user");
        let (_other, mut other_rx) = join(&room, "chat123", "s2", "u2");

        pipeline
            .process(&sender, r#"{"content":"anything"}"#)
            .await
            .unwrap();

        let frame = recv_json(&mut sender_rx);
        assert_eq!(frame["type"], json!("error"));
        assert_eq!(frame["code"], json!("USER_BANNED"));

        assert!(other_rx.try_recv().is_err());
        assert!(sender_rx.try_recv().is_err());
        assert!(room.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn broadcast_is_filtered_but_storage_keeps_the_original() {
        let (pipeline, room) = PipelineBuilder::default().build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");

        pipeline
            .process(&sender, r#"{"content":"this is a badword test"}"#)
            .await
            .unwrap();

        let frame = recv_json(&mut rx);
        assert_eq!(frame["content"], json!("this is a ******* test"));

        let saved = room.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_ne!(saved[0].content, "this is a badword test");
        assert_eq!(
            room.crypto.decrypt(&saved[0].content).unwrap(),
            "this is a badword test"
        );
    }

    #[tokio::test]
    async fn extra_client_fields_pass_through_but_cannot_spoof_envelope() {
        let (pipeline, room) = PipelineBuilder::default().build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");

        pipeline
            .process(
                &sender,
                r#"{"content":"hi","clientTag":"t-9","userId":"spoofed"}"#,
            )
            .await
            .unwrap();

        let frame = recv_json(&mut rx);
        assert_eq!(frame["clientTag"], json!("t-9"));
        assert_eq!(frame["userId"], json!("u1"));
    }

    #[tokio::test]
    async fn unknown_room_language_falls_back_to_default() {
        let (pipeline, room) = PipelineBuilder {
            language: None,
            ..Default::default()
        }
        .build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");

        pipeline
            .process(&sender, r#"{"content":"badword here"}"#)
            .await
            .unwrap();

        // Filtering still applies: the merged dictionary is scanned
        // regardless of the resolved language code.
        let frame = recv_json(&mut rx);
        assert_eq!(frame["content"], json!("******* here"));
    }

    #[tokio::test]
    async fn ban_lookup_outage_is_fatal_not_allowed() {
        let (pipeline, room) = PipelineBuilder {
            ban_outage: true,
            ..Default::default()
        }
        .build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");
        let (_other, mut other_rx) = join(&room, "r1", "s2", "u2");

        let result = pipeline.process(&sender, r#"{"content":"hi"}"#).await;
        assert!(matches!(result, Err(PipelineError::Collaborator(_))));
        assert!(rx.try_recv().is_err());
        assert!(other_rx.try_recv().is_err());
        assert!(room.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_prevents_broadcast() {
        let (pipeline, room) = PipelineBuilder {
            save_outage: true,
            ..Default::default()
        }
        .build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");

        let result = pipeline.process(&sender, r#"{"content":"hi"}"#).await;
        assert!(matches!(result, Err(PipelineError::Collaborator(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_frame_is_rejected_before_any_effect() {
        let (pipeline, room) = PipelineBuilder::default().build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");

        let result = pipeline.process(&sender, "not json at all").await;
        assert!(matches!(result, Err(PipelineError::MalformedFrame(_))));

        let result = pipeline.process(&sender, r#"{"noContent":true}"#).await;
        assert!(matches!(result, Err(PipelineError::MalformedFrame(_))));

        assert!(rx.try_recv().is_err());
        assert!(room.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sender_receives_their_own_message() {
        let (pipeline, room) = PipelineBuilder::default().build();
        let (sender, mut rx) = join(&room, "r1", "s1", "u1");

        pipeline
            .process(&sender, r#"{"content":"echo"}"#)
            .await
            .unwrap();

        assert_eq!(recv_json(&mut rx)["content"], json!("echo"));
    }
}
