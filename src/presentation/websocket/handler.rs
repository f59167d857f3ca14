//! Connection Lifecycle
//!
//! Drives each WebSocket connection through
//! connecting → authenticating → registered → closing, coordinating the
//! session registry, the audit log and the message pipeline. Every
//! connection runs on its own task, plus a writer task that drains the
//! session's outbound queue.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::registry::ChatSession;
use crate::domain::{Identity, IdentityProvider, LogType, RelatedEntityType};
use crate::startup::AppState;

/// Close status for a handshake missing required metadata.
const CLOSE_BAD_DATA: u16 = 1003;

/// Close status for a failed identity resolution.
const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// Connection-establishment metadata carried as query parameters.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(rename = "chatId")]
    pub chat_id: Option<String>,
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// Pre-registration admission checks: the room id is mandatory, then the
/// sender behind the token must resolve. Runs before the connection
/// touches the registry or the audit log, so a rejected handshake leaves
/// no trace beyond the close frame.
fn admit(
    params: ConnectParams,
    identity: &dyn IdentityProvider,
) -> Result<(String, Identity), (u16, &'static str)> {
    let Some(chat_id) = params.chat_id else {
        tracing::debug!("Connection attempt without chatId, closing");
        return Err((CLOSE_BAD_DATA, "missing chatId"));
    };

    let token = params.token.unwrap_or_default();
    match identity.resolve(&token) {
        Ok(identity) => Ok((chat_id, identity)),
        Err(e) => {
            tracing::debug!(chat_id = %chat_id, error = %e, "Identity resolution failed, closing");
            Err((CLOSE_POLICY_VIOLATION, "authentication failed"))
        }
    }
}

/// Handle one WebSocket connection from upgrade to close.
async fn handle_socket(mut socket: WebSocket, params: ConnectParams, state: AppState) {
    let (chat_id, identity) = match admit(params, state.identity.as_ref()) {
        Ok(admitted) => admitted,
        Err((code, reason)) => {
            close(&mut socket, code, reason).await;
            return;
        }
    };

    let session_id = Uuid::new_v4().to_string();

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Outbound queue drained by a dedicated writer task
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let session = Arc::new(ChatSession::new(
        session_id.clone(),
        chat_id.clone(),
        identity.clone(),
        tx,
    ));
    state.registry.register(session.clone());

    if let Err(e) = state
        .audit
        .record(
            &identity.user_id,
            LogType::ConnectionEstablished,
            &chat_id,
            RelatedEntityType::Chat,
        )
        .await
    {
        tracing::warn!(
            user_id = %identity.user_id,
            chat_id = %chat_id,
            error = %e,
            "Failed to record connection audit event"
        );
    }

    tracing::info!(
        session_id = %session_id,
        chat_id = %chat_id,
        user_id = %identity.user_id,
        "Connection established"
    );

    // Active: each inbound text frame runs the full message pipeline on
    // this task. A pipeline failure is fatal for the connection; the
    // in-flight message itself has already run to completion or failed
    // outright.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = state.pipeline.process(&session, text.as_str()).await {
                    tracing::error!(
                        session_id = %session_id,
                        chat_id = %chat_id,
                        user_id = %identity.user_id,
                        error = %e,
                        "Message pipeline failed, closing connection"
                    );
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(session_id = %session_id, "Connection closed by client");
                break;
            }
            Ok(_) => {
                // Ping/Pong are answered by axum; binary frames are ignored
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Closing -> Closed: deregister first so no further broadcast can
    // target this session, then record the audit event.
    state.registry.deregister(&chat_id, &session_id);

    if let Err(e) = state
        .audit
        .record(
            &identity.user_id,
            LogType::ConnectionClosed,
            &chat_id,
            RelatedEntityType::Chat,
        )
        .await
    {
        tracing::warn!(
            user_id = %identity.user_id,
            chat_id = %chat_id,
            error = %e,
            "Failed to record disconnection audit event"
        );
    }

    sender_task.abort();

    tracing::info!(
        session_id = %session_id,
        chat_id = %chat_id,
        user_id = %identity.user_id,
        "Connection closed"
    );
}

/// Send a close frame, logging rather than propagating transport errors.
async fn close(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "Error closing session");
    }
}
