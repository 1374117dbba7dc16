//! Session registry
//!
//! One registry instance is shared by `/ws/base`, `/ws/match` and
//! `/ws/message`: an authenticated user is reachable for private delivery no
//! matter which endpoint they connected through.

use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

use crate::domain::{ServerFrame, UserId};

/// Sender half of a connection's outbound queue. The writer task spawned by
/// the session driver owns the socket sink.
pub type FrameSender = mpsc::UnboundedSender<Message>;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<UserId, FrameSender>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated session. A second connection under the same
    /// user id replaces the first one's entry.
    pub async fn register(&self, user_id: UserId, sender: FrameSender) {
        let replaced = self
            .sessions
            .write()
            .await
            .insert(user_id.clone(), sender)
            .is_some();
        if replaced {
            tracing::warn!(user_id = %user_id, "replaced existing session for user");
        }
    }

    /// Remove a session, but only if `sender` is still the registered one.
    /// A replaced connection must not tear down its successor's entry.
    pub async fn unregister(&self, user_id: &UserId, sender: &FrameSender) {
        let mut sessions = self.sessions.write().await;
        if let Some(current) = sessions.get(user_id) {
            if current.same_channel(sender) {
                sessions.remove(user_id);
            }
        }
    }

    /// Send a frame to one user. Returns false when the user is offline or
    /// their connection is gone; dead entries are pruned.
    pub async fn send_to_user(&self, user_id: &UserId, frame: &ServerFrame) -> bool {
        let sender = { self.sessions.read().await.get(user_id).cloned() };
        match sender {
            Some(tx) => {
                if tx.send(Message::Text(frame.to_text())).is_ok() {
                    true
                } else {
                    self.sessions.write().await.remove(user_id);
                    false
                }
            }
            None => false,
        }
    }

    /// Broadcast a frame to every connected user, optionally excluding one.
    /// Dead entries found along the way are pruned.
    pub async fn broadcast(&self, frame: &ServerFrame, exclude: Option<&UserId>) {
        let targets: Vec<(UserId, FrameSender)> = {
            self.sessions
                .read()
                .await
                .iter()
                .filter(|(uid, _)| exclude != Some(*uid))
                .map(|(uid, tx)| (uid.clone(), tx.clone()))
                .collect()
        };

        let text = frame.to_text();
        let mut dead = Vec::new();
        for (uid, tx) in targets {
            if tx.send(Message::Text(text.clone())).is_err() {
                dead.push(uid);
            }
        }

        if !dead.is_empty() {
            let mut sessions = self.sessions.write().await;
            for uid in dead {
                sessions.remove(&uid);
            }
        }
    }

    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.sessions.read().await.contains_key(user_id)
    }
}
