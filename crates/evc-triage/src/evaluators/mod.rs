//! Category evaluators.
//!
//! Every emergency category implements [`Evaluator`]: given the detections
//! routed to it and the mock flag, it returns exactly one [`Judgment`].
//!
//! | Category | Trigger | Extra test | Live severity | Mock severity |
//! |----------|---------|------------|---------------|---------------|
//! | fall | `person` | width/height above ratio | 0.80 | 0.70 |
//! | fire | `fire` | none | 0.85 | 0.85 |
//! | smoke | `smoke` | none | 0.75 | 0.75 |
//! | drowning | `drowning` | none | 0.90 | 0.90 |
//! | overdose | `overdose` | none | 0.80 | 0.80 |
//!
//! Evaluators are pure: the same input always yields the same judgment.

pub mod drowning;
pub mod fall;
pub mod fire;
pub mod overdose;
pub mod smoke;

use evc_models::{
    BoundingBox, Detection, Event, EventType, Evidence, Judgment, ObjectDetection, Scene,
};

use crate::config::TriageConfig;

pub use fall::FallEvaluator;

/// Model name recorded in live evidence notes.
const LIVE_MODEL: &str = "YOLOv8";

/// Model name recorded in mock evidence notes.
const MOCK_MODEL: &str = "stub";

/// Severity judgment for one emergency category.
pub trait Evaluator: Send + Sync {
    /// Category this evaluator asserts.
    fn category(&self) -> EventType;

    /// Judge the given detections. Never panics on detections that lack
    /// the expected geometry; those are treated as non-matches.
    fn evaluate(&self, detections: &[Detection], mock: bool) -> Judgment;
}

/// Fixed scenario returned in mock mode.
#[derive(Debug, Clone, Copy)]
pub struct MockScenario {
    pub severity: f64,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub scene: Scene,
    pub explanation: &'static str,
    pub actions: &'static [&'static str],
}

/// Category-specific constants shared by live, mock and neutral judgments.
#[derive(Debug, Clone, Copy)]
pub struct Narrative {
    pub event_type: EventType,
    pub trigger_label: &'static str,
    pub severity: f64,
    pub scene: Scene,
    pub explanation: &'static str,
    pub actions: &'static [&'static str],
    pub reason: &'static str,
    pub mock: MockScenario,
    pub neutral_explanation: &'static str,
    pub neutral_action: &'static str,
}

impl Narrative {
    /// Judgment for a qualifying live detection.
    pub fn live_judgment(&self, detection: &ObjectDetection) -> Judgment {
        self.live_judgment_with(detection, Evidence::boxes([detection.bbox], self.scene))
    }

    /// Judgment for a qualifying live detection with caller-built evidence.
    pub fn live_judgment_with(&self, detection: &ObjectDetection, evidence: Evidence) -> Judgment {
        let evidence = evidence
            .with_note("model", LIVE_MODEL)
            .with_note("why", self.reason);
        let event =
            Event::new(self.event_type, detection.confidence, evidence.clone()).with_window(0.0);

        Judgment::new(self.severity, self.explanation)
            .with_actions(self.actions.iter().copied())
            .with_evidence(evidence)
            .with_event(event)
    }

    /// Deterministic mock-mode judgment.
    pub fn mock_judgment(&self) -> Judgment {
        let evidence = Evidence::boxes([self.mock.bbox], self.mock.scene)
            .with_note("model", MOCK_MODEL)
            .with_note("why", format!("Mock {} detection", self.event_type));
        let event = Event::new(self.event_type, self.mock.confidence, evidence.clone());

        Judgment::new(self.mock.severity, self.mock.explanation)
            .with_actions(self.mock.actions.iter().copied())
            .with_evidence(evidence)
            .with_event(event)
    }

    /// Neutral judgment when nothing qualified.
    pub fn neutral_judgment(&self) -> Judgment {
        Judgment::neutral(self.neutral_explanation, self.neutral_action)
    }
}

/// Evaluator for categories triggered by a label above a confidence threshold.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEvaluator {
    narrative: &'static Narrative,
    confidence_threshold: f64,
}

impl ThresholdEvaluator {
    pub fn new(narrative: &'static Narrative, confidence_threshold: f64) -> Self {
        Self {
            narrative,
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }
}

impl Evaluator for ThresholdEvaluator {
    fn category(&self) -> EventType {
        self.narrative.event_type
    }

    fn evaluate(&self, detections: &[Detection], mock: bool) -> Judgment {
        if mock {
            return self.narrative.mock_judgment();
        }

        detections
            .iter()
            .filter_map(Detection::as_object)
            .find(|object| {
                object.label == self.narrative.trigger_label
                    && object.confidence > self.confidence_threshold
            })
            .map(|object| self.narrative.live_judgment(object))
            .unwrap_or_else(|| self.narrative.neutral_judgment())
    }
}

/// The closed set of category evaluators.
#[derive(Debug, Clone, Copy)]
pub enum CategoryEvaluator {
    Fall(FallEvaluator),
    Fire(ThresholdEvaluator),
    Smoke(ThresholdEvaluator),
    Drowning(ThresholdEvaluator),
    Overdose(ThresholdEvaluator),
}

impl CategoryEvaluator {
    /// Build the evaluator for a category from configuration.
    pub fn for_category(event_type: EventType, config: &TriageConfig) -> Self {
        match event_type {
            EventType::Fall => CategoryEvaluator::Fall(FallEvaluator::new(
                config.fall_confidence_threshold,
                config.fall_aspect_ratio_threshold,
            )),
            EventType::Fire => {
                CategoryEvaluator::Fire(fire::evaluator(config.fire_confidence_threshold))
            }
            EventType::Smoke => {
                CategoryEvaluator::Smoke(smoke::evaluator(config.smoke_confidence_threshold))
            }
            EventType::Drowning => CategoryEvaluator::Drowning(drowning::evaluator(
                config.drowning_confidence_threshold,
            )),
            EventType::Overdose => CategoryEvaluator::Overdose(overdose::evaluator(
                config.overdose_confidence_threshold,
            )),
        }
    }
}

impl Evaluator for CategoryEvaluator {
    fn category(&self) -> EventType {
        match self {
            CategoryEvaluator::Fall(e) => e.category(),
            CategoryEvaluator::Fire(e)
            | CategoryEvaluator::Smoke(e)
            | CategoryEvaluator::Drowning(e)
            | CategoryEvaluator::Overdose(e) => e.category(),
        }
    }

    fn evaluate(&self, detections: &[Detection], mock: bool) -> Judgment {
        match self {
            CategoryEvaluator::Fall(e) => e.evaluate(detections, mock),
            CategoryEvaluator::Fire(e)
            | CategoryEvaluator::Smoke(e)
            | CategoryEvaluator::Drowning(e)
            | CategoryEvaluator::Overdose(e) => e.evaluate(detections, mock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_models::{PosePoint, NEUTRAL_SEVERITY};

    fn all_evaluators() -> Vec<CategoryEvaluator> {
        let config = TriageConfig::default();
        EventType::ALL
            .iter()
            .map(|event_type| CategoryEvaluator::for_category(*event_type, &config))
            .collect()
    }

    #[test]
    fn test_category_matches_construction() {
        let config = TriageConfig::default();
        for event_type in EventType::ALL {
            assert_eq!(
                CategoryEvaluator::for_category(*event_type, &config).category(),
                *event_type
            );
        }
    }

    #[test]
    fn test_mock_is_deterministic() {
        let detections = vec![Detection::object("fire", 0.1, BoundingBox::new(0, 0, 1, 1))];
        for evaluator in all_evaluators() {
            let first = serde_json::to_string(&evaluator.evaluate(&detections, true)).unwrap();
            let second = serde_json::to_string(&evaluator.evaluate(&detections, true)).unwrap();
            let empty = serde_json::to_string(&evaluator.evaluate(&[], true)).unwrap();
            assert_eq!(first, second);
            assert_eq!(first, empty);
        }
    }

    #[test]
    fn test_mock_judgments_are_high_severity_events() {
        for evaluator in all_evaluators() {
            let judgment = evaluator.evaluate(&[], true);
            assert!(judgment.severity >= 0.7, "{} mock too low", evaluator.category());
            assert_eq!(judgment.categories, vec![evaluator.category()]);
            assert_eq!(judgment.events.len(), 1);
            assert_eq!(judgment.events[0].window_seconds, 3.0);
        }
    }

    #[test]
    fn test_empty_input_is_neutral() {
        for evaluator in all_evaluators() {
            let judgment = evaluator.evaluate(&[], false);
            assert_eq!(judgment.severity, NEUTRAL_SEVERITY);
            assert_eq!(judgment.recommended_actions.len(), 1);
            assert!(judgment.evidence.is_empty());
            assert!(judgment.categories.is_empty());
            assert!(judgment.events.is_empty());
        }
    }

    #[test]
    fn test_pose_detections_never_match() {
        let pose = Detection::pose(0.99, [PosePoint::new("nose", 0.5, 0.5, 0.9)]);
        for evaluator in all_evaluators() {
            assert!(evaluator.evaluate(std::slice::from_ref(&pose), false).is_neutral());
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let evaluator = smoke::evaluator(0.5);
        let at = Detection::object("smoke", 0.5, BoundingBox::new(0, 0, 10, 10));
        let above = Detection::object("smoke", 0.51, BoundingBox::new(0, 0, 10, 10));
        assert!(evaluator.evaluate(&[at], false).is_neutral());
        assert_eq!(evaluator.evaluate(&[above], false).severity, 0.75);
    }

    #[test]
    fn test_first_qualifying_detection_wins() {
        let evaluator = fire::evaluator(0.5);
        let detections = vec![
            Detection::object("fire", 0.3, BoundingBox::new(0, 0, 5, 5)),
            Detection::object("fire", 0.7, BoundingBox::new(1, 1, 20, 20)),
            Detection::object("fire", 0.95, BoundingBox::new(2, 2, 30, 30)),
        ];
        let judgment = evaluator.evaluate(&detections, false);
        assert_eq!(judgment.events[0].confidence, 0.7);
        assert_eq!(
            judgment.evidence[0].boxes.as_deref(),
            Some(&[BoundingBox::new(1, 1, 20, 20)][..])
        );
    }
}
