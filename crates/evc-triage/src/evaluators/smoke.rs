//! Smoke: a `smoke` detection above the category threshold.

use evc_models::{BoundingBox, EventType, Scene};

use super::{MockScenario, Narrative, ThresholdEvaluator};

pub static NARRATIVE: Narrative = Narrative {
    event_type: EventType::Smoke,
    trigger_label: "smoke",
    severity: 0.75,
    scene: Scene::Indoor,
    explanation: "Visible smoke detected; potential fire hazard.",
    actions: &[
        "Call emergency services immediately.",
        "Evacuate the area if safe to do so.",
        "Check for fire sources and ventilate if possible.",
    ],
    reason: "Detected smoke object",
    mock: MockScenario {
        severity: 0.75,
        confidence: 0.88,
        bbox: BoundingBox {
            x: 150,
            y: 100,
            width: 200,
            height: 150,
        },
        scene: Scene::Indoor,
        explanation: "Visible smoke detected in the upper area; potential fire hazard.",
        actions: &[
            "Call emergency services immediately.",
            "Evacuate the area if safe to do so.",
            "Check for fire sources and ventilate if possible.",
        ],
    },
    neutral_explanation: "No smoke detected in the current window.",
    neutral_action: "Stay aware. If you smell smoke, investigate safely.",
};

/// Smoke evaluator with the given confidence threshold.
pub fn evaluator(confidence_threshold: f64) -> ThresholdEvaluator {
    ThresholdEvaluator::new(&NARRATIVE, confidence_threshold)
}
