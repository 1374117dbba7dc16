//! Domain types
//!
//! Identifiers and wire frames shared by every WebSocket endpoint.

pub mod frames;
pub mod ids;

pub use frames::{MatchStatus, ServerFrame};
pub use ids::{MatchId, UserId};
