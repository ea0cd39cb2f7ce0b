//! Emergency event categories.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category of emergency an evaluator can assert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Fire,
    Smoke,
    Fall,
    Drowning,
    Overdose,
}

impl EventType {
    /// All event types.
    pub const ALL: &'static [EventType] = &[
        EventType::Fire,
        EventType::Smoke,
        EventType::Fall,
        EventType::Drowning,
        EventType::Overdose,
    ];

    /// Returns the event type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Fire => "fire",
            EventType::Smoke => "smoke",
            EventType::Fall => "fall",
            EventType::Drowning => "drowning",
            EventType::Overdose => "overdose",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: {0}")]
pub struct EventTypeParseError(pub String);

impl FromStr for EventType {
    type Err = EventTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|event_type| event_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EventTypeParseError(s.to_string()))
    }
}
