//! `/ws/base` handler
//!
//! The plain chat endpoint: after auth, every inbound frame is relayed to
//! all other connected users wrapped in a `{"type": "message"}` envelope.
//! The whole inbound frame travels as `content`.

use async_trait::async_trait;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::IntoResponse,
};
use serde_json::Value;

use crate::app::{run_session, SessionCtx, SessionHooks};
use crate::domain::ServerFrame;
use crate::error::SessionError;
use crate::AppState;

pub async fn ws_base(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        run_session(
            socket,
            state.registry.clone(),
            state.config.max_frame_bytes,
            BaseHooks,
        )
    })
}

struct BaseHooks;

#[async_trait]
impl SessionHooks for BaseHooks {
    async fn on_connect(&self, ctx: &SessionCtx) {
        tracing::info!(user_id = %ctx.user_id, "user connected to /ws/base");
    }

    async fn on_frame(&self, ctx: &SessionCtx, frame: Value) -> Result<(), SessionError> {
        ctx.registry
            .broadcast(
                &ServerFrame::chat(ctx.user_id.clone(), frame),
                Some(&ctx.user_id),
            )
            .await;
        Ok(())
    }

    async fn on_disconnect(&self, ctx: &SessionCtx) {
        tracing::info!(user_id = %ctx.user_id, "user disconnected from /ws/base");
    }
}
