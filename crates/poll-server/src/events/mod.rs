//! Server→client event envelopes
//!
//! Every WebSocket payload is a JSON envelope `{event, data}`. Only
//! `results-update` is coalesced; the rest are emitted immediately.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Event names sent in the envelope's `event` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollEvent {
    /// A question was published and is now open for voting
    NewQuestion,
    /// The active question's lock flag changed
    LockStatus,
    /// Coalesced vote-tally snapshot
    ResultsUpdate,
    /// The live connection count changed
    ConnectionsUpdate,
    /// An audience emoji reaction
    Emoji,
}

impl PollEvent {
    /// Get the wire name of the event
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewQuestion => "new-question",
            Self::LockStatus => "lock-status",
            Self::ResultsUpdate => "results-update",
            Self::ConnectionsUpdate => "connections-update",
            Self::Emoji => "emoji",
        }
    }
}

impl fmt::Display for PollEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON frame delivered to every subscribed connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    pub data: Value,
}

impl Envelope {
    /// Build an envelope for an event
    #[must_use]
    pub fn new(event: PollEvent, data: Value) -> Self {
        Self {
            event: event.as_str().to_string(),
            data,
        }
    }

    /// Serialize to the wire format
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(PollEvent::NewQuestion.as_str(), "new-question");
        assert_eq!(PollEvent::ResultsUpdate.as_str(), "results-update");
        assert_eq!(PollEvent::ConnectionsUpdate.as_str(), "connections-update");
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = Envelope::new(PollEvent::Emoji, serde_json::json!({"emoji": "🎉"}));
        let json = envelope.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["event"], "emoji");
        assert_eq!(value["data"]["emoji"], "🎉");
    }
}
