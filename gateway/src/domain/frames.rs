//! Outbound wire frames
//!
//! Every JSON payload the gateway sends to a client. Variant shapes follow
//! the wire contract the frontend test scripts observe: most frames carry a
//! `type` discriminator, the auth confirmation carries `status` instead, and
//! error frames carry only `error`.

use serde::Serialize;
use serde_json::Value;

use super::ids::{MatchId, UserId};

/// Matchmaking status constants sent in `match_status` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    WaitingForMatch,
    AlreadyInQueue,
    AlreadyInMatch,
    StoppedMatching,
    NotInQueue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerFrame {
    Authenticated {
        status: &'static str,
        user_id: UserId,
    },
    MatchSystemConnected {
        #[serde(rename = "type")]
        kind: &'static str,
        message: &'static str,
        user_id: UserId,
    },
    MatchStatus {
        #[serde(rename = "type")]
        kind: &'static str,
        status: MatchStatus,
    },
    MatchFound {
        #[serde(rename = "type")]
        kind: &'static str,
        match_id: MatchId,
        partner_id: UserId,
    },
    MatchMessage {
        #[serde(rename = "type")]
        kind: &'static str,
        from: UserId,
        content: String,
        match_id: MatchId,
        timestamp: Option<String>,
    },
    MatchEnded {
        #[serde(rename = "type")]
        kind: &'static str,
        match_id: MatchId,
        ended_by: UserId,
    },
    MessageStatus {
        #[serde(rename = "type")]
        kind: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_user_id: Option<UserId>,
        delivered: bool,
        content: String,
    },
    UserJoined {
        #[serde(rename = "type")]
        kind: &'static str,
        user_id: UserId,
    },
    UserLeft {
        #[serde(rename = "type")]
        kind: &'static str,
        user_id: UserId,
    },
    BroadcastMessage {
        #[serde(rename = "type")]
        kind: &'static str,
        from: UserId,
        content: String,
        timestamp: Option<String>,
    },
    PrivateMessage {
        #[serde(rename = "type")]
        kind: &'static str,
        from: UserId,
        content: String,
        timestamp: Option<String>,
    },
    /// Default chat relay on `/ws/base`: the whole inbound frame is carried
    /// as `content`.
    Chat {
        #[serde(rename = "type")]
        kind: &'static str,
        from: UserId,
        content: Value,
    },
    Error {
        error: String,
    },
}

impl ServerFrame {
    pub fn authenticated(user_id: UserId) -> Self {
        Self::Authenticated {
            status: "authenticated",
            user_id,
        }
    }

    pub fn match_system_connected(user_id: UserId) -> Self {
        Self::MatchSystemConnected {
            kind: "match_system_connected",
            message: "Connected to match system",
            user_id,
        }
    }

    pub fn match_status(status: MatchStatus) -> Self {
        Self::MatchStatus {
            kind: "match_status",
            status,
        }
    }

    pub fn match_found(match_id: MatchId, partner_id: UserId) -> Self {
        Self::MatchFound {
            kind: "match_found",
            match_id,
            partner_id,
        }
    }

    pub fn match_message(
        from: UserId,
        content: String,
        match_id: MatchId,
        timestamp: Option<String>,
    ) -> Self {
        Self::MatchMessage {
            kind: "match_message",
            from,
            content,
            match_id,
            timestamp,
        }
    }

    pub fn match_ended(match_id: MatchId, ended_by: UserId) -> Self {
        Self::MatchEnded {
            kind: "match_ended",
            match_id,
            ended_by,
        }
    }

    /// Delivery confirmation for a relayed match message.
    pub fn relay_status(delivered: bool, content: String) -> Self {
        Self::MessageStatus {
            kind: "message_status",
            target_user_id: None,
            delivered,
            content,
        }
    }

    /// Delivery confirmation for a private message.
    pub fn private_status(target_user_id: UserId, delivered: bool, content: String) -> Self {
        Self::MessageStatus {
            kind: "message_status",
            target_user_id: Some(target_user_id),
            delivered,
            content,
        }
    }

    pub fn user_joined(user_id: UserId) -> Self {
        Self::UserJoined {
            kind: "user_joined",
            user_id,
        }
    }

    pub fn user_left(user_id: UserId) -> Self {
        Self::UserLeft {
            kind: "user_left",
            user_id,
        }
    }

    pub fn broadcast_message(from: UserId, content: String, timestamp: Option<String>) -> Self {
        Self::BroadcastMessage {
            kind: "broadcast_message",
            from,
            content,
            timestamp,
        }
    }

    pub fn private_message(from: UserId, content: String, timestamp: Option<String>) -> Self {
        Self::PrivateMessage {
            kind: "private_message",
            from,
            content,
            timestamp,
        }
    }

    pub fn chat(from: UserId, content: Value) -> Self {
        Self::Chat {
            kind: "message",
            from,
            content,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Serialize to the wire text. Frames contain no non-serializable data,
    /// so this cannot fail.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":"Internal error"}"#.to_string())
    }
}
