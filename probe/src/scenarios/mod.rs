//! Probe scenarios
//!
//! One module per gateway endpoint, each reproducing the payloads and timer
//! structure of the original frontend test script for that endpoint and
//! returning a report with machine-checkable verdicts.

use std::time::Duration;

use crate::client::ProbeError;
use crate::transcript::{Direction, Transcript};

pub mod base;
pub mod echo;
pub mod matchmaking;
pub mod message;
pub mod reverse;
pub mod upper;

/// Every scenario name, in the order `all` runs them.
pub const ALL: &[&str] = &["base", "echo", "match", "message", "reverse", "upper"];

/// Timing and addressing for a scenario run.
///
/// The defaults mirror the original scripts (1s between steps, stop matching
/// after 5s, message 2s after a match, end it after 10s).
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Gateway base URL, e.g. `ws://localhost:8000`.
    pub base_url: String,
    /// Overrides the script's fixed `test_user_<scenario>` id.
    pub user_override: Option<String>,
    /// Target for the private message in the message scenario.
    pub target_user_id: String,
    /// Delay between scripted steps.
    pub step: Duration,
    /// How long the match scenario waits before giving up on the queue.
    pub stop_after: Duration,
    /// Delay before sending a message into a found match.
    pub message_after: Duration,
    /// Delay before ending a found match.
    pub end_after: Duration,
    /// Per-frame receive timeout.
    pub recv_timeout: Duration,
    /// Window to drain late traffic before closing.
    pub linger: Duration,
}

impl ScenarioConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_override: None,
            target_user_id: "another_user".to_string(),
            step: Duration::from_secs(1),
            stop_after: Duration::from_secs(5),
            message_after: Duration::from_secs(2),
            end_after: Duration::from_secs(10),
            recv_timeout: Duration::from_secs(5),
            linger: Duration::from_millis(500),
        }
    }

    /// Millisecond-scale delays so tests don't sleep for real seconds.
    #[cfg(test)]
    pub fn fast(base_url: impl Into<String>) -> Self {
        Self {
            step: Duration::from_millis(10),
            stop_after: Duration::from_millis(100),
            message_after: Duration::from_millis(20),
            end_after: Duration::from_millis(200),
            recv_timeout: Duration::from_secs(2),
            linger: Duration::from_millis(50),
            ..Self::new(base_url)
        }
    }

    /// The user id a scenario authenticates with.
    pub fn user_id(&self, scenario: &str) -> String {
        self.user_override
            .clone()
            .unwrap_or_else(|| format!("test_user_{scenario}"))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// One named verdict over a scenario's transcript.
#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
}

impl Check {
    pub fn expect(name: &'static str, passed: bool) -> Self {
        Self { name, passed }
    }
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    pub transcript: Transcript,
    pub checks: Vec<Check>,
}

impl ScenarioReport {
    pub fn new(scenario: &'static str, transcript: Transcript, checks: Vec<Check>) -> Self {
        Self {
            scenario,
            transcript,
            checks,
        }
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Human-readable report: the transcript followed by the verdicts.
    pub fn render(&self) -> String {
        let mut out = format!("scenario: {}\n", self.scenario);
        for frame in self.transcript.frames() {
            let arrow = match frame.direction {
                Direction::Sent => "->",
                Direction::Received => "<-",
            };
            out.push_str(&format!("  {} {}\n", arrow, frame.payload));
        }
        out.push_str("checks:\n");
        for check in &self.checks {
            let mark = if check.passed { "ok  " } else { "FAIL" };
            out.push_str(&format!("  {} {}\n", mark, check.name));
        }
        out
    }
}

/// Run one scenario by name.
pub async fn run(name: &str, cfg: &ScenarioConfig) -> Result<ScenarioReport, ProbeError> {
    match name {
        "base" => base::run(cfg).await,
        "echo" => echo::run(cfg).await,
        "match" => matchmaking::run(cfg).await,
        "message" => message::run(cfg).await,
        "reverse" => reverse::run(cfg).await,
        "upper" => upper::run(cfg).await,
        other => {
            // Unknown names are caught in main before we get here.
            unreachable!("unknown scenario {other}")
        }
    }
}
