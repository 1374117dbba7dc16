//! `/ws/message` handler
//!
//! Broadcast and private delivery. Presence changes are announced to every
//! other user; private sends are confirmed to the sender with a
//! `message_status` frame whose `delivered` flag reflects whether the target
//! was reachable.

use async_trait::async_trait;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::IntoResponse,
};
use serde_json::Value;

use crate::app::{run_session, SessionCtx, SessionHooks};
use crate::domain::{ServerFrame, UserId};
use crate::error::SessionError;
use crate::AppState;

pub async fn ws_message(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        run_session(
            socket,
            state.registry.clone(),
            state.config.max_frame_bytes,
            MessageHooks,
        )
    })
}

struct MessageHooks;

fn text_field(frame: &Value, key: &str) -> Option<String> {
    frame.get(key).and_then(|v| v.as_str()).map(String::from)
}

#[async_trait]
impl SessionHooks for MessageHooks {
    async fn on_connect(&self, ctx: &SessionCtx) {
        ctx.registry
            .broadcast(
                &ServerFrame::user_joined(ctx.user_id.clone()),
                Some(&ctx.user_id),
            )
            .await;
    }

    async fn on_frame(&self, ctx: &SessionCtx, frame: Value) -> Result<(), SessionError> {
        // A frame without a type is treated as a broadcast.
        let kind = frame
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("broadcast")
            .to_string();
        let content = text_field(&frame, "content").unwrap_or_default();
        let timestamp = text_field(&frame, "timestamp");

        match kind.as_str() {
            "private" => {
                let target = match text_field(&frame, "target_user_id") {
                    Some(t) if !t.is_empty() => UserId::new(t),
                    _ => return Err(SessionError::MissingTarget),
                };

                let delivered = ctx
                    .registry
                    .send_to_user(
                        &target,
                        &ServerFrame::private_message(
                            ctx.user_id.clone(),
                            content.clone(),
                            timestamp,
                        ),
                    )
                    .await;

                ctx.send(&ServerFrame::private_status(target, delivered, content));
                Ok(())
            }
            "broadcast" => {
                ctx.registry
                    .broadcast(
                        &ServerFrame::broadcast_message(ctx.user_id.clone(), content, timestamp),
                        Some(&ctx.user_id),
                    )
                    .await;
                Ok(())
            }
            other => Err(SessionError::UnknownType(other.to_string())),
        }
    }

    async fn on_disconnect(&self, ctx: &SessionCtx) {
        ctx.registry
            .broadcast(
                &ServerFrame::user_left(ctx.user_id.clone()),
                Some(&ctx.user_id),
            )
            .await;
    }
}
