//! Application layer
//!
//! Session bookkeeping and matchmaking, shared by the WebSocket handlers.

pub mod matchmaking;
pub mod registry;
pub mod session;

pub use matchmaking::Matchmaker;
pub use registry::{FrameSender, SessionRegistry};
pub use session::{run_session, SessionCtx, SessionHooks};
