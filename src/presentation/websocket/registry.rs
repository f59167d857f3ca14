//! Session Registry
//!
//! Concurrency-safe mapping from room identifier to the set of currently
//! open sessions. Pure in-memory bookkeeping: no operation blocks on I/O,
//! and the DashMap shards keep unrelated rooms from contending on a
//! single lock.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::Identity;

/// One live connection's ephemeral identity and room binding.
///
/// Owned by the registry entry for its room; a session belongs to exactly
/// one room for its lifetime and is never persisted.
pub struct ChatSession {
    pub session_id: String,
    pub chat_id: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
    sender: mpsc::UnboundedSender<Message>,
}

impl ChatSession {
    pub fn new(
        session_id: String,
        chat_id: String,
        identity: Identity,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            session_id,
            chat_id,
            user_id: identity.user_id,
            username: identity.username,
            role: identity.role,
            sender,
        }
    }

    /// Whether the connection's writer is still accepting frames.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a raw frame for delivery. Returns false if the connection
    /// has already closed.
    pub fn send(&self, message: Message) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Serialize a value and queue it as a text frame.
    pub fn send_json<T: Serialize>(&self, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(text) => self.send(Message::Text(text.into())),
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "Failed to serialize frame");
                false
            }
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("session_id", &self.session_id)
            .field("chat_id", &self.chat_id)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Registry of open sessions grouped by room.
///
/// A room entry exists if and only if it holds at least one session:
/// `deregister` prunes entries that become empty, so `room_exists` going
/// false is observable immediately after the last session leaves.
pub struct SessionRegistry {
    rooms: DashMap<String, HashMap<String, Arc<ChatSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Register a session under its room. Re-registering the same
    /// session id replaces the previous entry, so a room never holds two
    /// entries for one connection.
    pub fn register(&self, session: Arc<ChatSession>) {
        self.rooms
            .entry(session.chat_id.clone())
            .or_default()
            .insert(session.session_id.clone(), session.clone());

        tracing::info!(
            session_id = %session.session_id,
            chat_id = %session.chat_id,
            user_id = %session.user_id,
            "Session registered"
        );
    }

    /// Remove a session from its room, pruning the room entry when it
    /// becomes empty. Returns whether a session was actually removed;
    /// unknown rooms and unknown session ids are no-ops.
    pub fn deregister(&self, chat_id: &str, session_id: &str) -> bool {
        let removed = self
            .rooms
            .get_mut(chat_id)
            .map(|mut sessions| sessions.remove(session_id).is_some())
            .unwrap_or(false);

        // Re-checks emptiness under the shard lock: a register racing
        // this call keeps the room alive.
        self.rooms.remove_if(chat_id, |_, sessions| sessions.is_empty());

        if removed {
            tracing::info!(
                session_id = %session_id,
                chat_id = %chat_id,
                "Session deregistered"
            );
        }
        removed
    }

    /// Stable snapshot of the room's sessions. Registrations after the
    /// snapshot was taken are not included.
    pub fn broadcast_targets(&self, chat_id: &str) -> Vec<Arc<ChatSession>> {
        self.rooms
            .get(chat_id)
            .map(|sessions| sessions.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the room currently has at least one registered session.
    pub fn room_exists(&self, chat_id: &str) -> bool {
        self.rooms.contains_key(chat_id)
    }

    /// Number of rooms with at least one session.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Total number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.rooms.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(chat_id: &str, session_id: &str) -> Arc<ChatSession> {
        let (tx, _rx) = mpsc::unbounded_channel();
        // Receiver is dropped, so these sessions read as closed; fine for
        // bookkeeping tests.
        Arc::new(ChatSession::new(
            session_id.to_string(),
            chat_id.to_string(),
            Identity {
                user_id: format!("user-{session_id}"),
                username: format!("name-{session_id}"),
                role: "USER".to_string(),
            },
            tx,
        ))
    }

    #[test]
    fn register_makes_room_visible() {
        let registry = SessionRegistry::new();
        assert!(!registry.room_exists("r1"));

        registry.register(session("r1", "s1"));
        assert!(registry.room_exists("r1"));
        assert_eq!(registry.broadcast_targets("r1").len(), 1);
    }

    #[test]
    fn same_session_id_is_not_duplicated() {
        let registry = SessionRegistry::new();
        registry.register(session("r1", "s1"));
        registry.register(session("r1", "s1"));
        assert_eq!(registry.broadcast_targets("r1").len(), 1);
    }

    #[test]
    fn empty_room_is_pruned() {
        let registry = SessionRegistry::new();
        registry.register(session("r1", "s1"));
        registry.register(session("r1", "s2"));
        registry.register(session("r1", "s3"));

        registry.deregister("r1", "s1");
        registry.deregister("r1", "s2");
        assert!(registry.room_exists("r1"));
        assert_eq!(registry.broadcast_targets("r1").len(), 1);

        registry.deregister("r1", "s3");
        assert!(!registry.room_exists("r1"));
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn deregister_unknown_session_is_a_noop() {
        let registry = SessionRegistry::new();
        registry.register(session("r1", "s1"));
        assert!(!registry.deregister("r1", "missing"));
        assert!(!registry.deregister("other-room", "s1"));
        assert!(registry.room_exists("r1"));
    }

    #[test]
    fn deregister_reports_whether_a_session_was_removed() {
        let registry = SessionRegistry::new();
        registry.register(session("r1", "s1"));
        registry.register(session("r1", "s2"));

        // Removal without pruning and removal with pruning both report
        // true; a repeat for the same id reports false.
        assert!(registry.deregister("r1", "s1"));
        assert!(!registry.deregister("r1", "s1"));
        assert!(registry.deregister("r1", "s2"));
        assert!(!registry.room_exists("r1"));
    }

    #[test]
    fn snapshot_is_not_affected_by_later_changes() {
        let registry = SessionRegistry::new();
        registry.register(session("r1", "s1"));
        registry.register(session("r1", "s2"));

        let snapshot = registry.broadcast_targets("r1");
        registry.deregister("r1", "s1");
        registry.register(session("r1", "s3"));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.broadcast_targets("r1").len(), 2);
    }

    #[test]
    fn rooms_are_isolated() {
        let registry = SessionRegistry::new();
        registry.register(session("r1", "s1"));
        registry.register(session("r2", "s2"));

        assert_eq!(registry.broadcast_targets("r1").len(), 1);
        assert_eq!(registry.broadcast_targets("r2").len(), 1);
        assert_eq!(registry.session_count(), 2);

        registry.deregister("r1", "s1");
        assert!(!registry.room_exists("r1"));
        assert!(registry.room_exists("r2"));
    }

    #[tokio::test]
    async fn concurrent_register_and_deregister_do_not_lose_sessions() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();

        for i in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let room = format!("room-{}", i % 4);
                let sid = format!("s-{i}");
                registry.register(session(&room, &sid));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.session_count(), 64);
        assert_eq!(registry.room_count(), 4);

        let mut handles = Vec::new();
        for i in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let room = format!("room-{}", i % 4);
                registry.deregister(&room, &format!("s-{i}"));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.session_count(), 0);
        assert_eq!(registry.room_count(), 0);
    }
}
