//! `/ws/reverse` scenario
//!
//! Sends `reverse test!` and expects the char-reversed string.

use crate::client::{ProbeClient, ProbeError};
use crate::scenarios::{Check, ScenarioConfig, ScenarioReport};

pub async fn run(cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    let mut client = ProbeClient::connect(&cfg.endpoint("/ws/reverse")).await?;

    client.send_text("reverse test!").await?;
    client.recv(cfg.recv_timeout).await?;
    client.close().await;

    let transcript = client.into_transcript();
    let checks = vec![Check::expect(
        "server reverses the string",
        transcript.received_text("!tset esrever"),
    )];
    Ok(ScenarioReport::new("reverse", transcript, checks))
}
