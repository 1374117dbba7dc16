//! `/ws/match` scenario
//!
//! Event-driven like the original script: inbound frames schedule the next
//! outbound step. Both branches are covered — a lone probe waits and then
//! stops matching; a matched probe sends a message into the match and ends
//! it.

use serde_json::{json, Value};
use tokio::time::Instant;

use crate::client::{ProbeClient, ProbeError};
use crate::scenarios::{Check, ScenarioConfig, ScenarioReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    StartMatching,
    StopMatching,
    MatchMessage,
    EndMatch,
}

struct Timer {
    at: Instant,
    step: Step,
}

fn payload(step: Step) -> Value {
    match step {
        Step::StartMatching => json!({ "type": "start_matching" }),
        Step::StopMatching => json!({ "type": "stop_matching" }),
        Step::MatchMessage => json!({
            "type": "match_message",
            "content": "Hi there! Nice to meet you!",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        Step::EndMatch => json!({ "type": "end_match" }),
    }
}

pub async fn run(cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    let user_id = cfg.user_id("match");
    let mut client = ProbeClient::connect(&cfg.endpoint("/ws/match")).await?;

    client.send_json(&json!({ "user_id": user_id })).await?;

    let mut timers: Vec<Timer> = Vec::new();
    let deadline = Instant::now() + cfg.stop_after + cfg.end_after + cfg.recv_timeout;
    let mut done = false;

    while !done && !client.is_closed() && Instant::now() < deadline {
        // Fire every due timer.
        let now = Instant::now();
        let mut i = 0;
        while i < timers.len() {
            if timers[i].at <= now {
                let timer = timers.remove(i);
                client.send_json(&payload(timer.step)).await?;
            } else {
                i += 1;
            }
        }

        let wait = timers
            .iter()
            .map(|t| t.at.duration_since(now))
            .min()
            .unwrap_or(cfg.recv_timeout)
            .min(cfg.recv_timeout);

        let Some(text) = client.recv(wait).await? else {
            continue;
        };
        let frame: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let now = Instant::now();

        if frame.get("status").and_then(|v| v.as_str()) == Some("authenticated") {
            tracing::info!(user_id = %user_id, "authentication successful");
            timers.push(Timer {
                at: now + cfg.step,
                step: Step::StartMatching,
            });
            continue;
        }

        match frame.get("type").and_then(|v| v.as_str()) {
            Some("match_status") => {
                match frame.get("status").and_then(|v| v.as_str()) {
                    Some("waiting_for_match") => {
                        tracing::info!("waiting for another user to match");
                        timers.push(Timer {
                            at: now + cfg.stop_after,
                            step: Step::StopMatching,
                        });
                    }
                    Some("stopped_matching") => done = true,
                    _ => {}
                }
            }
            Some("match_found") => {
                tracing::info!(
                    partner = frame["partner_id"].as_str().unwrap_or(""),
                    match_id = frame["match_id"].as_str().unwrap_or(""),
                    "match found"
                );
                // The waiting-branch stop timer is obsolete once matched.
                timers.retain(|t| t.step != Step::StopMatching);
                timers.push(Timer {
                    at: now + cfg.message_after,
                    step: Step::MatchMessage,
                });
                timers.push(Timer {
                    at: now + cfg.end_after,
                    step: Step::EndMatch,
                });
            }
            Some("match_ended") => done = true,
            _ => {}
        }
    }

    client.drain_for(cfg.linger).await?;
    client.close().await;

    let transcript = client.into_transcript();
    let checks = vec![
        Check::expect(
            "first inbound frame authenticates the sent user id",
            transcript.authenticated_as(&user_id),
        ),
        Check::expect(
            "match system welcome received",
            transcript
                .first_received_of_type("match_system_connected")
                .is_some(),
        ),
        Check::expect(
            "queue status or match observed",
            transcript.position_of_type("match_status").is_some()
                || transcript.position_of_type("match_found").is_some(),
        ),
        Check::expect(
            "match_found precedes all match traffic",
            transcript.match_found_precedes_match_traffic(),
        ),
    ];
    Ok(ScenarioReport::new("match", transcript, checks))
}
