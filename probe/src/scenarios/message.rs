//! `/ws/message` scenario
//!
//! Authenticate, broadcast to everyone, then send a private message to the
//! configured target and record the delivery status.

use serde_json::json;

use crate::client::{ProbeClient, ProbeError};
use crate::scenarios::{Check, ScenarioConfig, ScenarioReport};

pub async fn run(cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    let user_id = cfg.user_id("message");
    let mut client = ProbeClient::connect(&cfg.endpoint("/ws/message")).await?;

    client.send_json(&json!({ "user_id": user_id })).await?;
    client.recv(cfg.recv_timeout).await?;

    if client.transcript().authenticated_as(&user_id) {
        tracing::info!(user_id = %user_id, "authentication successful");

        tokio::time::sleep(cfg.step).await;
        client
            .send_json(&json!({
                "type": "broadcast",
                "content": "Hello everyone from message test!",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
            .await?;

        // Window between the two scripted sends; user_joined or
        // broadcast traffic from other clients lands here.
        client.drain_for(cfg.message_after).await?;

        client
            .send_json(&json!({
                "type": "private",
                "target_user_id": cfg.target_user_id,
                "content": "This is a private message",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
            .await?;
        client.drain_for(cfg.linger).await?;
    }
    client.close().await;

    let transcript = client.into_transcript();
    let checks = vec![
        Check::expect(
            "first inbound frame authenticates the sent user id",
            transcript.authenticated_as(&user_id),
        ),
        Check::expect(
            "private send is answered with a message_status",
            transcript.first_received_of_type("message_status").is_some(),
        ),
    ];
    Ok(ScenarioReport::new("message", transcript, checks))
}
