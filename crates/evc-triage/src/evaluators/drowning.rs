//! Drowning: a `drowning` detection above the category threshold.

use evc_models::{BoundingBox, EventType, Scene};

use super::{MockScenario, Narrative, ThresholdEvaluator};

pub static NARRATIVE: Narrative = Narrative {
    event_type: EventType::Drowning,
    trigger_label: "drowning",
    severity: 0.90,
    scene: Scene::Pool,
    explanation: "Person appears to be struggling in water; potential drowning situation.",
    actions: &[
        "Call emergency services immediately.",
        "Throw a flotation device if available.",
        "Do not enter water unless trained in water rescue.",
    ],
    reason: "Detected swimmer in distress",
    mock: MockScenario {
        severity: 0.90,
        confidence: 0.78,
        bbox: BoundingBox {
            x: 200,
            y: 150,
            width: 100,
            height: 80,
        },
        scene: Scene::Pool,
        explanation: "Person appears to be struggling in water; potential drowning situation.",
        actions: &[
            "Call emergency services immediately.",
            "Throw a flotation device if available.",
            "Do not enter water unless trained in water rescue.",
        ],
    },
    neutral_explanation: "No drowning risk detected in the current window.",
    neutral_action: "Stay aware. If someone appears to be struggling in water, call for help.",
};

/// Drowning evaluator with the given confidence threshold.
pub fn evaluator(confidence_threshold: f64) -> ThresholdEvaluator {
    ThresholdEvaluator::new(&NARRATIVE, confidence_threshold)
}
