//! `/ws/echo`, `/ws/reverse`, `/ws/upper`
//!
//! Stateless per-frame transforms with no auth and no registry. The literal
//! `bye` closes the connection from the server side.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;

pub async fn ws_echo(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_transform(socket, "echo", echo))
}

pub async fn ws_reverse(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_transform(socket, "reverse", reverse))
}

pub async fn ws_upper(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_transform(socket, "upper", upper))
}

fn echo(input: &str) -> String {
    input.to_string()
}

fn reverse(input: &str) -> String {
    input.chars().rev().collect()
}

fn upper(input: &str) -> String {
    input.to_uppercase()
}

async fn run_transform(mut socket: WebSocket, endpoint: &'static str, transform: fn(&str) -> String) {
    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                if text == "bye" {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                if socket.send(Message::Text(transform(&text))).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    tracing::debug!(endpoint, "transform session closed");
}
