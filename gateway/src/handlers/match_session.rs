//! `/ws/match` handler
//!
//! Matchmaking endpoint: queue management and partner relay are delegated to
//! the [`Matchmaker`]; this module only maps inbound frames onto it.

use async_trait::async_trait;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::IntoResponse,
};
use serde_json::Value;
use std::sync::Arc;

use crate::app::{run_session, Matchmaker, SessionCtx, SessionHooks};
use crate::domain::ServerFrame;
use crate::error::SessionError;
use crate::AppState;

pub async fn ws_match(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let hooks = MatchHooks {
        matchmaker: state.matchmaker.clone(),
    };
    ws.on_upgrade(move |socket| {
        run_session(
            socket,
            state.registry.clone(),
            state.config.max_frame_bytes,
            hooks,
        )
    })
}

struct MatchHooks {
    matchmaker: Arc<Matchmaker>,
}

#[async_trait]
impl SessionHooks for MatchHooks {
    async fn on_connect(&self, ctx: &SessionCtx) {
        tracing::info!(user_id = %ctx.user_id, "user joined match system");
        ctx.send(&ServerFrame::match_system_connected(ctx.user_id.clone()));
    }

    async fn on_frame(&self, ctx: &SessionCtx, frame: Value) -> Result<(), SessionError> {
        let kind = frame.get("type").and_then(|v| v.as_str()).unwrap_or("");

        match kind {
            "start_matching" => {
                self.matchmaker.start_matching(&ctx.user_id).await;
                Ok(())
            }
            "stop_matching" => {
                self.matchmaker.stop_matching(&ctx.user_id).await;
                Ok(())
            }
            "match_message" => {
                let content = frame
                    .get("content")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let timestamp = frame
                    .get("timestamp")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                self.matchmaker
                    .relay_message(&ctx.user_id, content, timestamp)
                    .await
            }
            "end_match" => self.matchmaker.end_match(&ctx.user_id).await,
            other => Err(SessionError::UnknownType(other.to_string())),
        }
    }

    async fn on_disconnect(&self, ctx: &SessionCtx) {
        self.matchmaker.handle_disconnect(&ctx.user_id).await;
        tracing::info!(user_id = %ctx.user_id, "user left match system");
    }
}
