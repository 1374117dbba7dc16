//! `/ws/echo` scenario
//!
//! Sends the literal `continue` and expects the identical string back.

use crate::client::{ProbeClient, ProbeError};
use crate::scenarios::{Check, ScenarioConfig, ScenarioReport};

pub async fn run(cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    let mut client = ProbeClient::connect(&cfg.endpoint("/ws/echo")).await?;

    client.send_text("continue").await?;
    client.recv(cfg.recv_timeout).await?;
    client.close().await;

    let transcript = client.into_transcript();
    let checks = vec![Check::expect(
        "server echoes the exact string",
        transcript.received_text("continue"),
    )];
    Ok(ScenarioReport::new("echo", transcript, checks))
}
