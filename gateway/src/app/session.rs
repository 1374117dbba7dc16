//! Session engine
//!
//! Drives the lifecycle every authenticated endpoint shares: first frame
//! authenticates, the session is registered, then each inbound text frame is
//! parsed as JSON and handed to the endpoint's hooks. Endpoint behavior
//! (base chat, matchmaking, private messaging) lives entirely in
//! [`SessionHooks`] implementations.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::app::{FrameSender, SessionRegistry};
use crate::domain::{ServerFrame, UserId};
use crate::error::SessionError;

/// Per-session context handed to hooks.
pub struct SessionCtx {
    pub user_id: UserId,
    pub registry: Arc<SessionRegistry>,
    sender: FrameSender,
}

impl SessionCtx {
    /// Send a frame to this session's own peer.
    pub fn send(&self, frame: &ServerFrame) {
        let _ = self.sender.send(Message::Text(frame.to_text()));
    }
}

/// Endpoint-specific behavior, invoked by the session driver.
///
/// `on_frame` errors are reported to the peer as `{"error": ...}` frames and
/// do not end the session.
#[async_trait]
pub trait SessionHooks: Send + Sync {
    async fn on_connect(&self, ctx: &SessionCtx);
    async fn on_frame(&self, ctx: &SessionCtx, frame: Value) -> Result<(), SessionError>;
    async fn on_disconnect(&self, ctx: &SessionCtx);
}

/// Run one authenticated session to completion.
pub async fn run_session<H: SessionHooks>(
    socket: WebSocket,
    registry: Arc<SessionRegistry>,
    max_frame_bytes: usize,
    hooks: H,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Writer task owns the sink; everything outbound goes through the
    // channel so registry broadcasts and the driver share one ordered queue.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // First text frame must authenticate.
    let user_id = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                // The size limit applies to the auth frame as well; failing
                // it pre-auth closes the socket like the other auth errors.
                let outcome = if text.len() > max_frame_bytes {
                    Err(SessionError::FrameTooLarge(max_frame_bytes))
                } else {
                    authenticate(&text)
                };
                match outcome {
                    Ok(user_id) => break user_id,
                    Err(err) => {
                        let _ = tx.send(Message::Text(err.to_frame().to_text()));
                        let _ = tx.send(Message::Close(None));
                        drop(tx);
                        let _ = writer.await;
                        return;
                    }
                }
            }
            // Control frames before auth are tolerated.
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                drop(tx);
                let _ = writer.await;
                return;
            }
            Some(Ok(_)) => continue,
        }
    };

    registry.register(user_id.clone(), tx.clone()).await;
    let ctx = SessionCtx {
        user_id,
        registry: registry.clone(),
        sender: tx.clone(),
    };

    ctx.send(&ServerFrame::authenticated(ctx.user_id.clone()));
    tracing::info!(user_id = %ctx.user_id, "session authenticated");
    hooks.on_connect(&ctx).await;

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if text.len() > max_frame_bytes {
                    ctx.send(&SessionError::FrameTooLarge(max_frame_bytes).to_frame());
                    continue;
                }
                match serde_json::from_str::<Value>(&text) {
                    Ok(frame) => {
                        if let Err(err) = hooks.on_frame(&ctx, frame).await {
                            tracing::debug!(user_id = %ctx.user_id, error = %err, "frame rejected");
                            ctx.send(&err.to_frame());
                        }
                    }
                    Err(_) => ctx.send(&SessionError::InvalidJson.to_frame()),
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, error = %err, "socket error");
                break;
            }
        }
    }

    registry.unregister(&ctx.user_id, &tx).await;
    tracing::info!(user_id = %ctx.user_id, "session closed");
    hooks.on_disconnect(&ctx).await;

    drop(ctx);
    drop(tx);
    let _ = writer.await;
}

/// Validate the auth frame: JSON with a non-null `user_id`.
fn authenticate(text: &str) -> Result<UserId, SessionError> {
    let value: Value = serde_json::from_str(text).map_err(|_| SessionError::InvalidJson)?;
    value
        .get("user_id")
        .and_then(UserId::from_json)
        .ok_or(SessionError::AuthFailed)
}
