//! `/ws/base` scenario
//!
//! Authenticate, then send one chat message after the scripted delay.

use serde_json::json;

use crate::client::{ProbeClient, ProbeError};
use crate::scenarios::{Check, ScenarioConfig, ScenarioReport};

pub async fn run(cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    let user_id = cfg.user_id("base");
    let mut client = ProbeClient::connect(&cfg.endpoint("/ws/base")).await?;

    client.send_json(&json!({ "user_id": user_id })).await?;
    client.recv(cfg.recv_timeout).await?;

    if client.transcript().authenticated_as(&user_id) {
        tracing::info!(user_id = %user_id, "authentication successful");
        tokio::time::sleep(cfg.step).await;
        client
            .send_json(&json!({
                "content": "Hello from base test client!",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
            .await?;
        client.drain_for(cfg.linger).await?;
    }
    client.close().await;

    let transcript = client.into_transcript();
    let checks = vec![Check::expect(
        "first inbound frame authenticates the sent user id",
        transcript.authenticated_as(&user_id),
    )];
    Ok(ScenarioReport::new("base", transcript, checks))
}
