//! `/ws/upper` scenario
//!
//! Sends `hello upper!` and expects the uppercased string.

use crate::client::{ProbeClient, ProbeError};
use crate::scenarios::{Check, ScenarioConfig, ScenarioReport};

pub async fn run(cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    let mut client = ProbeClient::connect(&cfg.endpoint("/ws/upper")).await?;

    client.send_text("hello upper!").await?;
    client.recv(cfg.recv_timeout).await?;
    client.close().await;

    let transcript = client.into_transcript();
    let checks = vec![Check::expect(
        "server uppercases the string",
        transcript.received_text("HELLO UPPER!"),
    )];
    Ok(ScenarioReport::new("upper", transcript, checks))
}
