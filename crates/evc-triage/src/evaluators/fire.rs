//! Fire: a `fire` detection above the confidence threshold.

use evc_models::{BoundingBox, EventType, Scene};

use super::{MockScenario, Narrative, ThresholdEvaluator};

pub static NARRATIVE: Narrative = Narrative {
    event_type: EventType::Fire,
    trigger_label: "fire",
    severity: 0.85,
    scene: Scene::Indoor,
    explanation: "Fire detected. Visible flames are present.",
    actions: &["Call emergency services.", "Evacuate immediately."],
    reason: "Detected fire object",
    mock: MockScenario {
        severity: 0.85,
        confidence: 0.82,
        bbox: BoundingBox {
            x: 240,
            y: 120,
            width: 160,
            height: 140,
        },
        scene: Scene::Indoor,
        explanation: "Visible flames detected in the scene; active fire hazard.",
        actions: &[
            "Call emergency services immediately.",
            "Evacuate the area and stay low to avoid smoke.",
            "Do not use elevators.",
        ],
    },
    neutral_explanation: "No fire detected in the current window.",
    neutral_action: "Stay aware. If you see flames, evacuate immediately.",
};

/// Fire evaluator with the given confidence threshold.
pub fn evaluator(confidence_threshold: f64) -> ThresholdEvaluator {
    ThresholdEvaluator::new(&NARRATIVE, confidence_threshold)
}
