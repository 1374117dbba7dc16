//! Session error types
//!
//! Every recoverable failure inside a WebSocket session is reported to the
//! peer as an `{"error": "..."}` frame; the error text is the wire contract,
//! so the `thiserror` display strings below are load-bearing.

use thiserror::Error;

use crate::domain::ServerFrame;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Not in a match session")]
    NotInMatch,

    #[error("Match session not found")]
    MatchNotFound,

    #[error("Partner not found")]
    PartnerNotFound,

    #[error("target_user_id is required for private messages")]
    MissingTarget,

    #[error("Message exceeds {0} byte limit")]
    FrameTooLarge(usize),
}

impl SessionError {
    /// Render as the error frame sent to the peer.
    pub fn to_frame(&self) -> ServerFrame {
        ServerFrame::error(self.to_string())
    }
}
