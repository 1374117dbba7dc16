//! Relay probe
//!
//! Replays the six endpoint test scripts against a running relay gateway and
//! reports machine-checked verdicts over the observed traffic.
//!
//! Logging goes to stderr; stdout carries the scenario reports.

mod client;
mod scenarios;
mod transcript;

#[cfg(test)]
mod testsupport;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use scenarios::ScenarioConfig;

fn usage() -> ! {
    eprintln!(
        "usage: relay-probe <base|echo|match|message|reverse|upper|all> \
         [--url ws://host:port] [--user ID] [--target ID] [--unique]"
    );
    std::process::exit(2);
}

/// Derive the HTTP health URL from the WebSocket base URL.
fn health_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let http = if let Some(rest) = base.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = base.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        base.to_string()
    };
    format!("{http}/health")
}

async fn check_health(base_url: &str) -> Result<()> {
    let url = health_url(base_url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()?;
    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("gateway not reachable at {url}"))?;
    if !resp.status().is_success() {
        bail!("health check failed with status {}", resp.status());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(scenario) = args.next() else { usage() };

    let mut url: Option<String> = None;
    let mut user: Option<String> = None;
    let mut target: Option<String> = None;
    let mut unique = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => url = Some(args.next().unwrap_or_else(|| usage())),
            "--user" => user = Some(args.next().unwrap_or_else(|| usage())),
            "--target" => target = Some(args.next().unwrap_or_else(|| usage())),
            "--unique" => unique = true,
            _ => usage(),
        }
    }

    let names: Vec<String> = match scenario.as_str() {
        "all" => scenarios::ALL.iter().map(|s| s.to_string()).collect(),
        name if scenarios::ALL.contains(&name) => vec![name.to_string()],
        _ => usage(),
    };

    let base_url = url
        .or_else(|| std::env::var("RELAY_PROBE_URL").ok())
        .unwrap_or_else(|| "ws://localhost:8000".to_string());

    check_health(&base_url).await?;
    tracing::info!(base_url = %base_url, "gateway is up");

    let mut template = ScenarioConfig::new(base_url);
    template.user_override = user;
    if let Some(target) = target {
        template.target_user_id = target;
    }

    let mut failures = 0;
    for name in &names {
        let mut cfg = template.clone();
        if unique && cfg.user_override.is_none() {
            cfg.user_override = Some(format!("test_user_{}_{}", name, Uuid::new_v4().simple()));
        }

        match scenarios::run(name, &cfg).await {
            Ok(report) => {
                println!("{}", report.render());
                if !report.passed() {
                    failures += 1;
                }
            }
            Err(err) => {
                tracing::error!(scenario = %name, error = %err, "scenario did not run");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} scenario(s) failed");
    }
    Ok(())
}
