//! WebSocket handlers
//!
//! One module per `/ws/*` route.

pub mod base;
pub mod match_session;
pub mod message;
pub mod transform;

pub use base::ws_base;
pub use match_session::ws_match;
pub use message::ws_message;
pub use transform::{ws_echo, ws_reverse, ws_upper};
