//! Severity judgments produced by category evaluators.
//!
//! A [`Judgment`] is the unit exchanged between evaluators, the arbitrator
//! and the transport layer. Its serialized form is the public response
//! contract of `analyze`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event_type::EventType;
use crate::geometry::{clamp_unit, BoundingBox, PosePoint};

/// Severity reported when the pipeline ran and found nothing.
pub const NEUTRAL_SEVERITY: f64 = 0.05;

/// Severity reserved for pipeline-level failures.
pub const FAILURE_SEVERITY: f64 = 0.0;

/// Default observation window attached to events.
pub const DEFAULT_WINDOW_SECONDS: f64 = 3.0;

/// Scene context in which evidence was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    Pool,
    Indoor,
    Street,
    #[default]
    Unknown,
}

/// Supporting detail for a judgment or event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Evidence {
    #[serde(default)]
    pub boxes: Option<Vec<BoundingBox>>,
    #[serde(default)]
    pub pose: Option<BTreeMap<String, PosePoint>>,
    #[serde(default)]
    pub scene: Scene,
    /// Extra model-specific evidence
    #[serde(default)]
    pub notes: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Evidence {
    /// Evidence for a set of boxes in the given scene.
    pub fn boxes(boxes: impl IntoIterator<Item = BoundingBox>, scene: Scene) -> Self {
        Self {
            boxes: Some(boxes.into_iter().collect()),
            pose: None,
            scene,
            notes: None,
        }
    }

    /// Attach the model name and a short reason to the notes.
    pub fn with_note(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.notes
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// A typed event asserted by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Event confidence (0.0-1.0)
    pub confidence: f64,
    pub evidence: Evidence,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,
    /// Seconds from the start of the analyzed stream
    pub timestamp: f64,
}

fn default_window_seconds() -> f64 {
    DEFAULT_WINDOW_SECONDS
}

impl Event {
    /// Create an event. Confidence is clamped to [0, 1].
    pub fn new(event_type: EventType, confidence: f64, evidence: Evidence) -> Self {
        Self {
            event_type,
            confidence: clamp_unit(confidence),
            evidence,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            timestamp: 0.0,
        }
    }

    /// Override the observation window.
    pub fn with_window(mut self, window_seconds: f64) -> Self {
        self.window_seconds = window_seconds.max(0.0);
        self
    }

    /// Set the event timestamp.
    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp.max(0.0);
        self
    }
}

/// Severity assessment with explanation, recommendations and evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Judgment {
    /// Severity (0.0-1.0)
    pub severity: f64,
    pub explanation: String,
    pub recommended_actions: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub categories: Vec<EventType>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Judgment {
    /// Create a judgment with no evidence. Severity is clamped to [0, 1].
    pub fn new(severity: f64, explanation: impl Into<String>) -> Self {
        Self {
            severity: clamp_unit(severity),
            explanation: explanation.into(),
            recommended_actions: Vec::new(),
            evidence: Vec::new(),
            categories: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Set the recommended actions, in order.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommended_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Append an evidence entry.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    /// Append an event, asserting its category.
    pub fn with_event(mut self, event: Event) -> Self {
        if !self.categories.contains(&event.event_type) {
            self.categories.push(event.event_type);
        }
        self.events.push(event);
        self
    }

    /// Neutral "nothing found" judgment.
    pub fn neutral(explanation: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(NEUTRAL_SEVERITY, explanation).with_actions([action.into()])
    }

    /// Neutral judgment returned when no evaluator produced anything.
    pub fn no_event() -> Self {
        Self::neutral(
            "No high-risk event or specific object detected in the current window.",
            "Continue monitoring.",
        )
    }

    /// Fallback judgment for a failed pipeline run.
    pub fn failure(cause: impl std::fmt::Display) -> Self {
        Self::new(
            FAILURE_SEVERITY,
            format!("Analysis error: {}. Check technical logs.", cause),
        )
        .with_actions(["Contact technical support if this error persists."])
    }

    /// True when the judgment reports no event at all.
    pub fn is_neutral(&self) -> bool {
        self.events.is_empty() && self.severity <= NEUTRAL_SEVERITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_event_asserts_category_once() {
        let evidence = Evidence::boxes([BoundingBox::new(0, 0, 10, 10)], Scene::Indoor);
        let judgment = Judgment::new(0.85, "Fire")
            .with_event(Event::new(EventType::Fire, 0.9, evidence.clone()))
            .with_event(Event::new(EventType::Fire, 0.7, evidence));

        assert_eq!(judgment.categories, vec![EventType::Fire]);
        assert_eq!(judgment.events.len(), 2);
    }

    #[test]
    fn test_severity_clamped() {
        assert_eq!(Judgment::new(1.7, "x").severity, 1.0);
        assert_eq!(Judgment::new(-0.2, "x").severity, 0.0);
    }

    #[test]
    fn test_failure_judgment_shape() {
        let judgment = Judgment::failure("camera unplugged");
        assert_eq!(judgment.severity, FAILURE_SEVERITY);
        assert!(judgment.explanation.contains("camera unplugged"));
        assert_eq!(judgment.recommended_actions.len(), 1);
        assert!(judgment.evidence.is_empty());
        assert!(judgment.categories.is_empty());
        assert!(judgment.events.is_empty());
    }

    #[test]
    fn test_serialized_contract() {
        let evidence = Evidence::boxes([BoundingBox::new(10, 10, 50, 50)], Scene::Indoor)
            .with_note("model", "YOLOv8");
        let judgment = Judgment::new(0.85, "Fire detected.")
            .with_actions(["Evacuate immediately."])
            .with_evidence(evidence.clone())
            .with_event(Event::new(EventType::Fire, 0.9, evidence).with_window(0.0));

        let json = serde_json::to_value(&judgment).unwrap();
        assert_eq!(json["severity"], 0.85);
        assert_eq!(json["categories"], serde_json::json!(["fire"]));
        assert_eq!(json["events"][0]["type"], "fire");
        assert_eq!(json["events"][0]["window_seconds"], 0.0);
        assert_eq!(json["evidence"][0]["scene"], "indoor");
        assert_eq!(json["evidence"][0]["boxes"][0]["w"], 50);
        assert_eq!(json["evidence"][0]["notes"]["model"], "YOLOv8");
    }
}
