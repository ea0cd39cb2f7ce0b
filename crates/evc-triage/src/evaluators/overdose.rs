//! Overdose: an `overdose` detection above the category threshold.

use evc_models::{BoundingBox, EventType, Scene};

use super::{MockScenario, Narrative, ThresholdEvaluator};

pub static NARRATIVE: Narrative = Narrative {
    event_type: EventType::Overdose,
    trigger_label: "overdose",
    severity: 0.80,
    scene: Scene::Indoor,
    explanation: "Person appears unresponsive; potential overdose situation detected.",
    actions: &[
        "Call emergency services immediately.",
        "Check for breathing and pulse.",
        "Administer naloxone if available and trained.",
    ],
    reason: "Detected unresponsive person",
    mock: MockScenario {
        severity: 0.80,
        confidence: 0.65,
        bbox: BoundingBox {
            x: 80,
            y: 200,
            width: 120,
            height: 100,
        },
        scene: Scene::Indoor,
        explanation: "Person appears unresponsive; potential overdose situation detected.",
        actions: &[
            "Call emergency services immediately.",
            "Check for breathing and pulse.",
            "Administer naloxone if available and trained.",
        ],
    },
    neutral_explanation: "No overdose risk detected in the current window.",
    neutral_action: "Stay aware. If someone appears unresponsive, check on them.",
};

/// Overdose evaluator with the given confidence threshold.
pub fn evaluator(confidence_threshold: f64) -> ThresholdEvaluator {
    ThresholdEvaluator::new(&NARRATIVE, confidence_threshold)
}
