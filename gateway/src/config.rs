use std::env;

#[derive(Clone)]
pub struct Config {
    /// Interface to bind, e.g. `0.0.0.0`.
    pub bind_addr: String,
    /// Listen port; the test scripts expect 8000.
    pub port: u16,
    /// Inbound text frames larger than this are rejected with an error frame.
    pub max_frame_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            bind_addr: env::var("RELAY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            max_frame_bytes: env::var("RELAY_MAX_FRAME_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
            max_frame_bytes: 64 * 1024,
        }
    }
}
