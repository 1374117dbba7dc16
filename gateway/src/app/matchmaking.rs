//! Matchmaking
//!
//! Pairs waiting users into match sessions and relays messages between the
//! two participants. All bookkeeping lives behind one mutex; outbound frames
//! are sent through the shared [`SessionRegistry`] after the lock is
//! released.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::app::SessionRegistry;
use crate::domain::{MatchId, MatchStatus, ServerFrame, UserId};
use crate::error::SessionError;

#[derive(Default)]
struct MatchState {
    /// FIFO queue of users waiting for a partner.
    queue: VecDeque<UserId>,
    /// Active matches and their two participants.
    active: HashMap<MatchId, [UserId; 2]>,
    /// Reverse index from participant to their match.
    by_user: HashMap<UserId, MatchId>,
}

enum StartOutcome {
    AlreadyInQueue,
    AlreadyInMatch,
    Waiting,
    Paired { match_id: MatchId, partner: UserId },
}

pub struct Matchmaker {
    registry: Arc<SessionRegistry>,
    state: Mutex<MatchState>,
}

impl Matchmaker {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            state: Mutex::new(MatchState::default()),
        }
    }

    /// Enter the wait queue, or pair with the first compatible waiter.
    /// Both participants get a `match_found` frame; a lone user gets
    /// `waiting_for_match`.
    pub async fn start_matching(&self, user: &UserId) {
        let outcome = {
            let mut state = self.state.lock().expect("match state poisoned");
            if state.queue.contains(user) {
                StartOutcome::AlreadyInQueue
            } else if state.by_user.contains_key(user) {
                StartOutcome::AlreadyInMatch
            } else {
                // A user id is never its own partner; the queue-membership
                // check above already short-circuits the self case.
                match state.queue.iter().position(|waiting| waiting != user) {
                    Some(idx) => {
                        let partner = state.queue.remove(idx).expect("index in bounds");
                        let match_id = MatchId::for_pair(user, &partner);
                        state
                            .active
                            .insert(match_id.clone(), [user.clone(), partner.clone()]);
                        state.by_user.insert(user.clone(), match_id.clone());
                        state.by_user.insert(partner.clone(), match_id.clone());
                        StartOutcome::Paired { match_id, partner }
                    }
                    None => {
                        state.queue.push_back(user.clone());
                        StartOutcome::Waiting
                    }
                }
            }
        };

        match outcome {
            StartOutcome::AlreadyInQueue => {
                self.send_status(user, MatchStatus::AlreadyInQueue).await;
            }
            StartOutcome::AlreadyInMatch => {
                self.send_status(user, MatchStatus::AlreadyInMatch).await;
            }
            StartOutcome::Waiting => {
                self.send_status(user, MatchStatus::WaitingForMatch).await;
            }
            StartOutcome::Paired { match_id, partner } => {
                tracing::info!(match_id = %match_id, user = %user, partner = %partner, "match created");
                self.registry
                    .send_to_user(user, &ServerFrame::match_found(match_id.clone(), partner.clone()))
                    .await;
                self.registry
                    .send_to_user(&partner, &ServerFrame::match_found(match_id, user.clone()))
                    .await;
            }
        }
    }

    /// Leave the wait queue.
    pub async fn stop_matching(&self, user: &UserId) {
        let was_queued = {
            let mut state = self.state.lock().expect("match state poisoned");
            match state.queue.iter().position(|waiting| waiting == user) {
                Some(idx) => {
                    state.queue.remove(idx);
                    true
                }
                None => false,
            }
        };

        let status = if was_queued {
            MatchStatus::StoppedMatching
        } else {
            MatchStatus::NotInQueue
        };
        self.send_status(user, status).await;
    }

    /// Forward a message to the match partner and confirm delivery to the
    /// sender.
    pub async fn relay_message(
        &self,
        user: &UserId,
        content: String,
        timestamp: Option<String>,
    ) -> Result<(), SessionError> {
        let (match_id, partner) = {
            let state = self.state.lock().expect("match state poisoned");
            let match_id = state.by_user.get(user).ok_or(SessionError::NotInMatch)?.clone();
            let pair = state
                .active
                .get(&match_id)
                .ok_or(SessionError::MatchNotFound)?;
            let partner = pair
                .iter()
                .find(|uid| *uid != user)
                .ok_or(SessionError::PartnerNotFound)?
                .clone();
            (match_id, partner)
        };

        let forwarded = ServerFrame::match_message(
            user.clone(),
            content.clone(),
            match_id,
            timestamp,
        );
        let delivered = self.registry.send_to_user(&partner, &forwarded).await;

        self.registry
            .send_to_user(user, &ServerFrame::relay_status(delivered, content))
            .await;
        Ok(())
    }

    /// End the user's active match and notify both participants.
    pub async fn end_match(&self, user: &UserId) -> Result<(), SessionError> {
        let ended = {
            let mut state = self.state.lock().expect("match state poisoned");
            let match_id = state.by_user.get(user).ok_or(SessionError::NotInMatch)?.clone();
            match state.active.remove(&match_id) {
                Some(pair) => {
                    for uid in &pair {
                        state.by_user.remove(uid);
                    }
                    Some((match_id, pair))
                }
                None => {
                    // Stale index entry; drop it without notifying anyone.
                    state.by_user.remove(user);
                    None
                }
            }
        };

        if let Some((match_id, pair)) = ended {
            tracing::info!(match_id = %match_id, ended_by = %user, "match ended");
            let frame = ServerFrame::match_ended(match_id, user.clone());
            for uid in &pair {
                self.registry.send_to_user(uid, &frame).await;
            }
        }
        Ok(())
    }

    /// Session cleanup: dequeue if waiting, end the active match if any.
    pub async fn handle_disconnect(&self, user: &UserId) {
        let was_queued = {
            let mut state = self.state.lock().expect("match state poisoned");
            match state.queue.iter().position(|waiting| waiting == user) {
                Some(idx) => {
                    state.queue.remove(idx);
                    true
                }
                None => false,
            }
        };
        if was_queued {
            tracing::debug!(user = %user, "removed from match queue on disconnect");
        }

        // Ends the match and notifies the remaining participant.
        let _ = self.end_match(user).await;
    }

    async fn send_status(&self, user: &UserId, status: MatchStatus) {
        self.registry
            .send_to_user(user, &ServerFrame::match_status(status))
            .await;
    }
}
