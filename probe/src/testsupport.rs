//! In-process mock gateways for scenario tests
//!
//! Minimal tokio-tungstenite servers on ephemeral ports: a per-frame text
//! transform and a scripted JSON responder that plays the gateway's side of
//! the auth/match/message flows.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

type ServerSocket = WebSocketStream<TcpStream>;

async fn serve<F>(handler: F) -> SocketAddr
where
    F: Fn(ServerSocket) -> tokio::task::JoinHandle<()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let ws = accept_async(stream).await.unwrap();
            handler(ws);
        }
    });
    addr
}

async fn reply(ws: &mut ServerSocket, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

/// Echo-style server applying `transform` to each text frame.
pub async fn transform_server(transform: fn(&str) -> String) -> SocketAddr {
    serve(move |mut ws| {
        tokio::spawn(async move {
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    if ws.send(Message::Text(transform(&text))).await.is_err() {
                        break;
                    }
                }
            }
        })
    })
    .await
}

fn auth_reply(frame: &Value) -> Value {
    json!({
        "status": "authenticated",
        "user_id": frame.get("user_id").cloned().unwrap_or(Value::Null)
    })
}

/// Plays the gateway's side of the base flow: authenticate, then stay quiet.
pub async fn base_server() -> SocketAddr {
    serve(|mut ws| {
        tokio::spawn(async move {
            let mut authed = false;
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let frame: Value = serde_json::from_str(&text).unwrap();
                if !authed {
                    authed = true;
                    reply(&mut ws, auth_reply(&frame)).await;
                }
            }
        })
    })
    .await
}

/// Plays the message flow: auth, then `message_status` confirmations for
/// private sends.
pub async fn message_server() -> SocketAddr {
    serve(|mut ws| {
        tokio::spawn(async move {
            let mut authed = false;
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let frame: Value = serde_json::from_str(&text).unwrap();
                if !authed {
                    authed = true;
                    reply(&mut ws, auth_reply(&frame)).await;
                    continue;
                }
                if frame.get("type").and_then(|v| v.as_str()) == Some("private") {
                    reply(
                        &mut ws,
                        json!({
                            "type": "message_status",
                            "target_user_id": frame["target_user_id"],
                            "delivered": false,
                            "content": frame["content"]
                        }),
                    )
                    .await;
                }
            }
        })
    })
    .await
}

/// Plays the match flow. `instant_match` selects which branch of the script
/// the probe will exercise: an immediate `match_found` with a scripted
/// partner, or a `waiting_for_match` status that forces the stop branch.
pub async fn match_server(instant_match: bool) -> SocketAddr {
    serve(move |mut ws| {
        tokio::spawn(async move {
            let mut user_id = Value::Null;
            let mut authed = false;
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let frame: Value = serde_json::from_str(&text).unwrap();
                if !authed {
                    authed = true;
                    user_id = frame.get("user_id").cloned().unwrap_or(Value::Null);
                    reply(&mut ws, auth_reply(&frame)).await;
                    reply(
                        &mut ws,
                        json!({
                            "type": "match_system_connected",
                            "message": "Connected to match system",
                            "user_id": user_id
                        }),
                    )
                    .await;
                    continue;
                }
                match frame.get("type").and_then(|v| v.as_str()) {
                    Some("start_matching") if instant_match => {
                        reply(
                            &mut ws,
                            json!({
                                "type": "match_found",
                                "match_id": "match_partner_probe",
                                "partner_id": "partner"
                            }),
                        )
                        .await;
                    }
                    Some("start_matching") => {
                        reply(
                            &mut ws,
                            json!({ "type": "match_status", "status": "waiting_for_match" }),
                        )
                        .await;
                    }
                    Some("stop_matching") => {
                        reply(
                            &mut ws,
                            json!({ "type": "match_status", "status": "stopped_matching" }),
                        )
                        .await;
                    }
                    Some("match_message") => {
                        reply(
                            &mut ws,
                            json!({
                                "type": "message_status",
                                "delivered": true,
                                "content": frame["content"]
                            }),
                        )
                        .await;
                        reply(
                            &mut ws,
                            json!({
                                "type": "match_message",
                                "from": "partner",
                                "content": "Hi back!",
                                "match_id": "match_partner_probe",
                                "timestamp": null
                            }),
                        )
                        .await;
                    }
                    Some("end_match") => {
                        reply(
                            &mut ws,
                            json!({
                                "type": "match_ended",
                                "match_id": "match_partner_probe",
                                "ended_by": user_id
                            }),
                        )
                        .await;
                    }
                    _ => {}
                }
            }
        })
    })
    .await
}
