//! Broadcast Engine
//!
//! Fans a finalized frame out to every open session of a room. The frame
//! is serialized once; sends are issued sequentially on the calling task
//! and sessions found closed at send time are skipped. Registry cleanup
//! for those stale entries happens only through the lifecycle manager's
//! close path, never opportunistically here.

use std::sync::Arc;

use axum::extract::ws::Message;

use super::frames::BroadcastFrame;
use super::registry::SessionRegistry;

/// Fan-out engine over the session registry.
pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Send `frame` to every open session of the room. Returns how many
    /// sessions accepted the frame.
    pub fn broadcast(
        &self,
        chat_id: &str,
        frame: &BroadcastFrame,
    ) -> Result<usize, serde_json::Error> {
        let text = serde_json::to_string(frame)?;

        let mut delivered = 0;
        for session in self.registry.broadcast_targets(chat_id) {
            if !session.is_open() {
                tracing::debug!(
                    session_id = %session.session_id,
                    chat_id = %chat_id,
                    "Skipping closed session during broadcast"
                );
                continue;
            }
            if session.send(Message::Text(text.clone().into())) {
                delivered += 1;
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;
    use crate::presentation::websocket::registry::ChatSession;
    use pretty_assertions::assert_eq;
    use serde_json::Map;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn frame(chat_id: &str, content: &str) -> BroadcastFrame {
        BroadcastFrame {
            user_id: "u1".into(),
            username: "alice".into(),
            chat_id: chat_id.into(),
            created_at: 0,
            message_id: Uuid::new_v4(),
            content: content.into(),
            role: "USER".into(),
            extra: Map::new(),
        }
    }

    fn open_session(
        chat_id: &str,
        session_id: &str,
    ) -> (Arc<ChatSession>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(ChatSession::new(
            session_id.to_string(),
            chat_id.to_string(),
            Identity {
                user_id: "u1".into(),
                username: "alice".into(),
                role: "USER".into(),
            },
            tx,
        ));
        (session, rx)
    }

    #[tokio::test]
    async fn delivers_to_all_open_sessions() {
        let registry = Arc::new(SessionRegistry::new());
        let (s1, mut rx1) = open_session("r1", "s1");
        let (s2, mut rx2) = open_session("r1", "s2");
        registry.register(s1);
        registry.register(s2);

        let broadcaster = Broadcaster::new(registry);
        let delivered = broadcaster.broadcast("r1", &frame("r1", "hello")).unwrap();

        assert_eq!(delivered, 2);
        for rx in [&mut rx1, &mut rx2] {
            let Some(Message::Text(text)) = rx.recv().await else {
                panic!("expected text frame");
            };
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            assert_eq!(value["content"], "hello");
            assert_eq!(value["chatId"], "r1");
        }
    }

    #[tokio::test]
    async fn skips_closed_sessions() {
        let registry = Arc::new(SessionRegistry::new());
        let (open, mut rx) = open_session("r1", "s1");
        let (closed, closed_rx) = open_session("r1", "s2");
        drop(closed_rx);
        registry.register(open);
        registry.register(closed);

        let broadcaster = Broadcaster::new(registry);
        let delivered = broadcaster.broadcast("r1", &frame("r1", "hi")).unwrap();

        assert_eq!(delivered, 1);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn unknown_room_delivers_nothing() {
        let broadcaster = Broadcaster::new(Arc::new(SessionRegistry::new()));
        assert_eq!(broadcaster.broadcast("nope", &frame("nope", "x")).unwrap(), 0);
    }
}
