//! Full integration tests for the relay gateway
//!
//! Each test spins the real router on an ephemeral port and drives it with
//! tokio-tungstenite clients, the same way the original frontend scripts
//! drove the endpoints.
//!
//! Run with: cargo test integration_tests

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio::net::TcpStream;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
    use uuid::Uuid;

    use crate::config::Config;
    use crate::{app, AppState};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn spawn_gateway() -> SocketAddr {
        let state = AppState::new(Config::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.unwrap();
        });
        addr
    }

    async fn connect(addr: SocketAddr, path: &str) -> Client {
        let (ws, _) = connect_async(format!("ws://{addr}{path}")).await.unwrap();
        ws
    }

    fn test_user(prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }

    async fn recv_text(ws: &mut Client) -> String {
        loop {
            let msg = timeout(Duration::from_secs(2), ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("socket error");
            if let Message::Text(text) = msg {
                return text;
            }
        }
    }

    async fn recv_json(ws: &mut Client) -> Value {
        serde_json::from_str(&recv_text(ws).await).unwrap()
    }

    async fn send_text(ws: &mut Client, text: &str) {
        ws.send(Message::Text(text.to_string())).await.unwrap();
    }

    async fn send_json(ws: &mut Client, value: Value) {
        send_text(ws, &value.to_string()).await;
    }

    async fn authenticate(ws: &mut Client, user_id: &str) {
        send_json(ws, json!({ "user_id": user_id })).await;
        let frame = recv_json(ws).await;
        assert_eq!(frame["status"], "authenticated");
        assert_eq!(frame["user_id"], user_id);
    }

    /// The stream must end (optionally after a close frame) without further
    /// text frames.
    async fn expect_closed(ws: &mut Client) {
        loop {
            match timeout(Duration::from_secs(2), ws.next())
                .await
                .expect("timed out waiting for close")
            {
                Some(Ok(Message::Close(_))) | None => return,
                Some(Ok(Message::Text(text))) => panic!("expected close, got text: {text}"),
                Some(Ok(_)) => continue,
                Some(Err(_)) => return,
            }
        }
    }

    // --- transform endpoints ---

    #[tokio::test]
    async fn echo_returns_the_exact_string() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/echo").await;

        send_text(&mut ws, "continue").await;
        assert_eq!(recv_text(&mut ws).await, "continue");
    }

    #[tokio::test]
    async fn reverse_returns_the_reversed_string() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/reverse").await;

        send_text(&mut ws, "reverse test!").await;
        assert_eq!(recv_text(&mut ws).await, "!tset esrever");
    }

    #[tokio::test]
    async fn upper_returns_the_uppercased_string() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/upper").await;

        send_text(&mut ws, "hello upper!").await;
        assert_eq!(recv_text(&mut ws).await, "HELLO UPPER!");
    }

    #[tokio::test]
    async fn bye_closes_a_transform_socket() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/echo").await;

        send_text(&mut ws, "ping").await;
        assert_eq!(recv_text(&mut ws).await, "ping");

        send_text(&mut ws, "bye").await;
        expect_closed(&mut ws).await;
    }

    // --- authentication ---

    #[tokio::test]
    async fn base_authenticates_and_echoes_the_user_id() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/base").await;
        authenticate(&mut ws, &test_user("test_user_base")).await;
    }

    #[tokio::test]
    async fn numeric_user_id_is_normalized_to_text() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/base").await;

        send_json(&mut ws, json!({ "user_id": 1007 })).await;
        let frame = recv_json(&mut ws).await;
        assert_eq!(frame["status"], "authenticated");
        assert_eq!(frame["user_id"], "1007");
    }

    #[tokio::test]
    async fn invalid_json_auth_is_rejected_and_closed() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/base").await;

        send_text(&mut ws, "not json").await;
        let frame = recv_json(&mut ws).await;
        assert_eq!(frame["error"], "Invalid JSON format");
        expect_closed(&mut ws).await;
    }

    #[tokio::test]
    async fn auth_without_user_id_is_rejected_and_closed() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/match").await;

        send_json(&mut ws, json!({ "content": "hello" })).await;
        let frame = recv_json(&mut ws).await;
        assert_eq!(frame["error"], "Authentication failed");
        expect_closed(&mut ws).await;
    }

    #[tokio::test]
    async fn invalid_json_after_auth_keeps_the_session() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/base").await;
        authenticate(&mut ws, &test_user("u")).await;

        send_text(&mut ws, "{broken").await;
        let frame = recv_json(&mut ws).await;
        assert_eq!(frame["error"], "Invalid JSON format");

        // Session is still usable.
        send_json(&mut ws, json!({ "content": "still here" })).await;
    }

    #[tokio::test]
    async fn oversized_auth_frame_is_rejected_and_closed() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/base").await;

        let user_id = "x".repeat(70 * 1024);
        send_json(&mut ws, json!({ "user_id": user_id })).await;
        let frame = recv_json(&mut ws).await;
        assert_eq!(frame["error"], "Message exceeds 65536 byte limit");
        expect_closed(&mut ws).await;
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let addr = spawn_gateway().await;
        let mut ws = connect(addr, "/ws/message").await;
        authenticate(&mut ws, &test_user("u")).await;

        let content = "x".repeat(70 * 1024);
        send_json(&mut ws, json!({ "type": "broadcast", "content": content })).await;
        let frame = recv_json(&mut ws).await;
        assert_eq!(frame["error"], "Message exceeds 65536 byte limit");
    }

    // --- /ws/base chat ---

    #[tokio::test]
    async fn base_relays_frames_to_other_users() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/base").await;
        let mut bob = connect(addr, "/ws/base").await;
        authenticate(&mut alice, "alice").await;
        authenticate(&mut bob, "bob").await;

        let payload = json!({
            "content": "Hello from base test client!",
            "timestamp": "2026-08-29T00:00:00Z"
        });
        send_json(&mut alice, payload.clone()).await;

        let frame = recv_json(&mut bob).await;
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["from"], "alice");
        assert_eq!(frame["content"], payload);
    }

    // --- /ws/message ---

    #[tokio::test]
    async fn message_endpoint_announces_joins_and_leaves() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;

        let mut bob = connect(addr, "/ws/message").await;
        authenticate(&mut bob, "bob").await;

        let joined = recv_json(&mut alice).await;
        assert_eq!(joined["type"], "user_joined");
        assert_eq!(joined["user_id"], "bob");

        bob.close(None).await.unwrap();
        let left = recv_json(&mut alice).await;
        assert_eq!(left["type"], "user_left");
        assert_eq!(left["user_id"], "bob");
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone_else() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        let mut bob = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;
        authenticate(&mut bob, "bob").await;
        // alice sees bob join
        assert_eq!(recv_json(&mut alice).await["type"], "user_joined");

        send_json(
            &mut alice,
            json!({
                "type": "broadcast",
                "content": "Hello everyone from message test!",
                "timestamp": "2026-08-29T00:00:00Z"
            }),
        )
        .await;

        let frame = recv_json(&mut bob).await;
        assert_eq!(frame["type"], "broadcast_message");
        assert_eq!(frame["from"], "alice");
        assert_eq!(frame["content"], "Hello everyone from message test!");
    }

    #[tokio::test]
    async fn typeless_frame_defaults_to_broadcast() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        let mut bob = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;
        authenticate(&mut bob, "bob").await;
        assert_eq!(recv_json(&mut alice).await["type"], "user_joined");

        send_json(&mut alice, json!({ "content": "no type field here" })).await;

        let frame = recv_json(&mut bob).await;
        assert_eq!(frame["type"], "broadcast_message");
        assert_eq!(frame["from"], "alice");
        assert_eq!(frame["content"], "no type field here");
    }

    #[tokio::test]
    async fn private_message_is_delivered_and_confirmed() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        let mut bob = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;
        authenticate(&mut bob, "bob").await;
        assert_eq!(recv_json(&mut alice).await["type"], "user_joined");

        send_json(
            &mut alice,
            json!({
                "type": "private",
                "target_user_id": "bob",
                "content": "This is a private message",
                "timestamp": "2026-08-29T00:00:00Z"
            }),
        )
        .await;

        let private = recv_json(&mut bob).await;
        assert_eq!(private["type"], "private_message");
        assert_eq!(private["from"], "alice");
        assert_eq!(private["content"], "This is a private message");

        let status = recv_json(&mut alice).await;
        assert_eq!(status["type"], "message_status");
        assert_eq!(status["target_user_id"], "bob");
        assert_eq!(status["delivered"], true);
    }

    #[tokio::test]
    async fn private_message_to_offline_user_reports_undelivered() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;

        send_json(
            &mut alice,
            json!({ "type": "private", "target_user_id": "another_user", "content": "hi" }),
        )
        .await;

        let status = recv_json(&mut alice).await;
        assert_eq!(status["type"], "message_status");
        assert_eq!(status["target_user_id"], "another_user");
        assert_eq!(status["delivered"], false);
    }

    #[tokio::test]
    async fn private_message_requires_a_target() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;

        send_json(&mut alice, json!({ "type": "private", "content": "hi" })).await;
        let frame = recv_json(&mut alice).await;
        assert_eq!(
            frame["error"],
            "target_user_id is required for private messages"
        );
    }

    #[tokio::test]
    async fn unknown_message_type_is_an_error() {
        let addr = spawn_gateway().await;
        let mut alice = connect(addr, "/ws/message").await;
        authenticate(&mut alice, "alice").await;

        send_json(&mut alice, json!({ "type": "teleport" })).await;
        let frame = recv_json(&mut alice).await;
        assert_eq!(frame["error"], "Unknown message type: teleport");
    }

    // --- /ws/match ---

    async fn connect_match(addr: SocketAddr, user_id: &str) -> Client {
        let mut ws = connect(addr, "/ws/match").await;
        authenticate(&mut ws, user_id).await;
        let welcome = recv_json(&mut ws).await;
        assert_eq!(welcome["type"], "match_system_connected");
        assert_eq!(welcome["user_id"], user_id);
        ws
    }

    #[tokio::test]
    async fn match_lifecycle_found_message_ended() {
        let addr = spawn_gateway().await;
        let mut alice = connect_match(addr, "alice").await;
        let mut bob = connect_match(addr, "bob").await;

        send_json(&mut alice, json!({ "type": "start_matching" })).await;
        let status = recv_json(&mut alice).await;
        assert_eq!(status["type"], "match_status");
        assert_eq!(status["status"], "waiting_for_match");

        send_json(&mut bob, json!({ "type": "start_matching" })).await;

        // match_found arrives on both sides before any match traffic
        let found_alice = recv_json(&mut alice).await;
        let found_bob = recv_json(&mut bob).await;
        assert_eq!(found_alice["type"], "match_found");
        assert_eq!(found_bob["type"], "match_found");
        assert_eq!(found_alice["partner_id"], "bob");
        assert_eq!(found_bob["partner_id"], "alice");
        assert_eq!(found_alice["match_id"], found_bob["match_id"]);

        send_json(
            &mut bob,
            json!({
                "type": "match_message",
                "content": "Hi there! Nice to meet you!",
                "timestamp": "2026-08-29T00:00:00Z"
            }),
        )
        .await;

        let relayed = recv_json(&mut alice).await;
        assert_eq!(relayed["type"], "match_message");
        assert_eq!(relayed["from"], "bob");
        assert_eq!(relayed["content"], "Hi there! Nice to meet you!");
        assert_eq!(relayed["match_id"], found_alice["match_id"]);

        let status = recv_json(&mut bob).await;
        assert_eq!(status["type"], "message_status");
        assert_eq!(status["delivered"], true);

        send_json(&mut bob, json!({ "type": "end_match" })).await;
        let ended_alice = recv_json(&mut alice).await;
        let ended_bob = recv_json(&mut bob).await;
        assert_eq!(ended_alice["type"], "match_ended");
        assert_eq!(ended_alice["ended_by"], "bob");
        assert_eq!(ended_bob["type"], "match_ended");
    }

    #[tokio::test]
    async fn stop_matching_statuses() {
        let addr = spawn_gateway().await;
        let mut alice = connect_match(addr, "alice").await;

        send_json(&mut alice, json!({ "type": "stop_matching" })).await;
        assert_eq!(recv_json(&mut alice).await["status"], "not_in_queue");

        send_json(&mut alice, json!({ "type": "start_matching" })).await;
        assert_eq!(recv_json(&mut alice).await["status"], "waiting_for_match");

        send_json(&mut alice, json!({ "type": "stop_matching" })).await;
        assert_eq!(recv_json(&mut alice).await["status"], "stopped_matching");
    }

    #[tokio::test]
    async fn match_message_without_a_match_is_an_error() {
        let addr = spawn_gateway().await;
        let mut alice = connect_match(addr, "alice").await;

        send_json(&mut alice, json!({ "type": "match_message", "content": "hi" })).await;
        assert_eq!(
            recv_json(&mut alice).await["error"],
            "Not in a match session"
        );
    }

    #[tokio::test]
    async fn partner_disconnect_ends_the_match() {
        let addr = spawn_gateway().await;
        let mut alice = connect_match(addr, "alice").await;
        let mut bob = connect_match(addr, "bob").await;

        send_json(&mut alice, json!({ "type": "start_matching" })).await;
        assert_eq!(recv_json(&mut alice).await["status"], "waiting_for_match");
        send_json(&mut bob, json!({ "type": "start_matching" })).await;
        assert_eq!(recv_json(&mut alice).await["type"], "match_found");
        assert_eq!(recv_json(&mut bob).await["type"], "match_found");

        bob.close(None).await.unwrap();

        let ended = recv_json(&mut alice).await;
        assert_eq!(ended["type"], "match_ended");
        assert_eq!(ended["ended_by"], "bob");
    }
}
