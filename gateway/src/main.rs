//! Relay gateway
//!
//! WebSocket session gateway: authenticated chat (`/ws/base`), matchmaking
//! (`/ws/match`), broadcast/private messaging (`/ws/message`) and three
//! stateless transform endpoints (`/ws/echo`, `/ws/reverse`, `/ws/upper`).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod domain;
mod error;
mod handlers;

#[cfg(test)]
mod integration_tests;

use app::{Matchmaker, SessionRegistry};
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub matchmaker: Arc<Matchmaker>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let matchmaker = Arc::new(Matchmaker::new(registry.clone()));
        Self {
            registry,
            matchmaker,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws/base", get(handlers::ws_base))
        .route("/ws/echo", get(handlers::ws_echo))
        .route("/ws/match", get(handlers::ws_match))
        .route("/ws/message", get(handlers::ws_message))
        .route("/ws/reverse", get(handlers::ws_reverse))
        .route("/ws/upper", get(handlers::ws_upper))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting relay gateway...");

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .expect("invalid bind address");

    let state = AppState::new(config);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app(state)).await.expect("server error");
}
