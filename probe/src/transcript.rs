//! Traffic transcript
//!
//! Everything a scenario sends and receives, in order. The original scripts
//! asserted expected message shapes by reading console output; the checks
//! here make those assertions machine-readable.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub direction: Direction,
    pub payload: String,
}

impl Frame {
    /// Parse the payload as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.payload).ok()
    }

    /// String value of a JSON field, if present.
    pub fn field(&self, key: &str) -> Option<String> {
        self.json()?
            .get(key)
            .and_then(|v| v.as_str().map(String::from))
    }

    fn is_type(&self, kind: &str) -> bool {
        self.field("type").as_deref() == Some(kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    frames: Vec<Frame>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&mut self, payload: impl Into<String>) {
        self.frames.push(Frame {
            direction: Direction::Sent,
            payload: payload.into(),
        });
    }

    pub fn record_received(&mut self, payload: impl Into<String>) {
        self.frames.push(Frame {
            direction: Direction::Received,
            payload: payload.into(),
        });
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn received(&self) -> impl Iterator<Item = &Frame> {
        self.frames
            .iter()
            .filter(|f| f.direction == Direction::Received)
    }

    /// Did any inbound frame equal this exact text?
    pub fn received_text(&self, expected: &str) -> bool {
        self.received().any(|f| f.payload == expected)
    }

    /// The first inbound frame must be `{"status": "authenticated"}` carrying
    /// the same user id that was sent.
    pub fn authenticated_as(&self, user_id: &str) -> bool {
        match self.received().next() {
            Some(frame) => {
                frame.field("status").as_deref() == Some("authenticated")
                    && frame.field("user_id").as_deref() == Some(user_id)
            }
            None => false,
        }
    }

    /// First inbound frame with the given `type`, parsed.
    pub fn first_received_of_type(&self, kind: &str) -> Option<Value> {
        self.received().find(|f| f.is_type(kind))?.json()
    }

    /// Index (among inbound frames) of the first frame with this `type`.
    pub fn position_of_type(&self, kind: &str) -> Option<usize> {
        self.received().position(|f| f.is_type(kind))
    }

    /// Ordering invariant for the match endpoint: if any `match_message` or
    /// `match_ended` was observed, a `match_found` must have come first.
    /// Vacuously true when no match traffic was observed.
    pub fn match_found_precedes_match_traffic(&self) -> bool {
        let traffic = [
            self.position_of_type("match_message"),
            self.position_of_type("match_ended"),
        ]
        .into_iter()
        .flatten()
        .min();

        match traffic {
            Some(first_traffic) => match self.position_of_type("match_found") {
                Some(found) => found < first_traffic,
                None => false,
            },
            None => true,
        }
    }
}
