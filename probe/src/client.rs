//! WebSocket client for the probe
//!
//! Thin wrapper over tokio-tungstenite that records every text frame into a
//! [`Transcript`]. Close and error events are logged the way the original
//! scripts logged `onclose`/`onerror`; neither is retried.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::transcript::Transcript;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub struct ProbeClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    transcript: Transcript,
    closed: bool,
}

impl ProbeClient {
    pub async fn connect(url: &str) -> Result<Self, ProbeError> {
        let (ws, _) = connect_async(url).await.map_err(|source| ProbeError::Connect {
            url: url.to_string(),
            source,
        })?;
        tracing::info!(url, "connected");
        Ok(Self {
            ws,
            transcript: Transcript::new(),
            closed: false,
        })
    }

    pub async fn send_text(&mut self, text: &str) -> Result<(), ProbeError> {
        tracing::debug!(payload = text, "sending");
        self.transcript.record_sent(text);
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_json(&mut self, value: &Value) -> Result<(), ProbeError> {
        self.send_text(&value.to_string()).await
    }

    /// Wait up to `wait` for the next text frame. Returns `None` on timeout
    /// or when the connection has closed; the frame is recorded either way.
    pub async fn recv(&mut self, wait: Duration) -> Result<Option<String>, ProbeError> {
        if self.closed {
            return Ok(None);
        }
        loop {
            let next = match timeout(wait, self.ws.next()).await {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!(payload = %text, "received");
                    self.transcript.record_received(&text);
                    return Ok(Some(text));
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("connection closed");
                    self.closed = true;
                    return Ok(None);
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "socket error");
                    self.closed = true;
                    return Ok(None);
                }
            }
        }
    }

    /// Keep receiving (and recording) frames for the given window.
    pub async fn drain_for(&mut self, window: Duration) -> Result<(), ProbeError> {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let now = tokio::time::Instant::now();
            if now >= deadline || self.closed {
                return Ok(());
            }
            self.recv(deadline - now).await?;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn close(&mut self) {
        if !self.closed {
            let _ = self.ws.close(None).await;
            self.closed = true;
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}
