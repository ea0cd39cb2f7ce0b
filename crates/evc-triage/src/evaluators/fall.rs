//! Fall: a confident `person` whose box is wider than it is tall.
//!
//! A horizontal posture (aspect ratio above the configured threshold) is
//! treated as a person on the ground. Zero-height boxes never match.

use evc_models::{BoundingBox, Detection, EventType, Evidence, Judgment, ObjectDetection, Scene};

use super::{Evaluator, MockScenario, Narrative};

pub static NARRATIVE: Narrative = Narrative {
    event_type: EventType::Fall,
    trigger_label: "person",
    severity: 0.8,
    scene: Scene::Unknown,
    explanation: "Potential fall detected. The person appears to be on the ground.",
    actions: &["Review the camera feed immediately.", "Alert a team member."],
    reason: "Person bounding box is horizontal",
    mock: MockScenario {
        severity: 0.7,
        confidence: 0.72,
        bbox: BoundingBox {
            x: 120,
            y: 300,
            width: 220,
            height: 90,
        },
        scene: Scene::Indoor,
        explanation: "[MOCK] A fall has been detected.",
        actions: &["Call emergency services.", "Check on the individual."],
    },
    neutral_explanation: "No fall event detected. The area is clear.",
    neutral_action: "Continue monitoring.",
};

/// Fall evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallEvaluator {
    confidence_threshold: f64,
    aspect_ratio_threshold: f64,
}

impl FallEvaluator {
    pub fn new(confidence_threshold: f64, aspect_ratio_threshold: f64) -> Self {
        Self {
            confidence_threshold,
            aspect_ratio_threshold,
        }
    }

    /// Aspect ratio of a qualifying person, or `None` if it does not qualify.
    fn horizontal_ratio(&self, person: &ObjectDetection) -> Option<f64> {
        let confident = person.confidence > self.confidence_threshold;
        if person.label != NARRATIVE.trigger_label || !confident {
            return None;
        }
        person
            .bbox
            .aspect_ratio()
            .filter(|ratio| *ratio > self.aspect_ratio_threshold)
    }
}

impl Default for FallEvaluator {
    fn default() -> Self {
        Self::new(0.5, 1.5)
    }
}

impl Evaluator for FallEvaluator {
    fn category(&self) -> EventType {
        EventType::Fall
    }

    fn evaluate(&self, detections: &[Detection], mock: bool) -> Judgment {
        if mock {
            return NARRATIVE.mock_judgment();
        }

        detections
            .iter()
            .filter_map(Detection::as_object)
            .find_map(|person| self.horizontal_ratio(person).map(|ratio| (person, ratio)))
            .map(|(person, ratio)| {
                let evidence = Evidence::boxes([person.bbox], NARRATIVE.scene)
                    .with_note("aspect_ratio", ratio);
                NARRATIVE.live_judgment_with(person, evidence)
            })
            .unwrap_or_else(|| NARRATIVE.neutral_judgment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_models::NEUTRAL_SEVERITY;

    fn person(confidence: f64, width: u32, height: u32) -> Detection {
        Detection::object("person", confidence, BoundingBox::new(100, 200, width, height))
    }

    #[test]
    fn test_horizontal_person_is_fall() {
        let judgment = FallEvaluator::default().evaluate(&[person(0.6, 150, 80)], false);

        assert_eq!(judgment.severity, 0.8);
        assert!(judgment.explanation.contains("fall"));
        assert_eq!(judgment.categories, vec![EventType::Fall]);
        assert_eq!(judgment.events[0].confidence, 0.6);
        let notes = judgment.evidence[0].notes.as_ref().unwrap();
        assert!((notes["aspect_ratio"].as_f64().unwrap() - 1.875).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_gate() {
        let judgment = FallEvaluator::default().evaluate(&[person(0.4, 150, 80)], false);
        assert_eq!(judgment.severity, NEUTRAL_SEVERITY);
        assert_eq!(judgment.explanation, NARRATIVE.neutral_explanation);
        assert!(judgment.events.is_empty());
    }

    #[test]
    fn test_upright_person_is_not_fall() {
        let judgment = FallEvaluator::default().evaluate(&[person(0.9, 60, 170)], false);
        assert!(judgment.is_neutral());
    }

    #[test]
    fn test_ratio_threshold_is_exclusive() {
        let judgment = FallEvaluator::default().evaluate(&[person(0.9, 150, 100)], false);
        assert!(judgment.is_neutral());
    }

    #[test]
    fn test_zero_height_box_is_non_match() {
        let judgment = FallEvaluator::default().evaluate(&[person(0.9, 150, 0)], false);
        assert!(judgment.is_neutral());
    }

    #[test]
    fn test_nan_confidence_is_non_match() {
        let detection = Detection::Object(ObjectDetection {
            label: "person".to_string(),
            confidence: f64::NAN,
            bbox: BoundingBox::new(0, 0, 150, 80),
        });
        assert!(FallEvaluator::default().evaluate(&[detection], false).is_neutral());
    }

    #[test]
    fn test_configurable_thresholds() {
        let strict = FallEvaluator::new(0.7, 2.0);
        assert!(strict.evaluate(&[person(0.6, 150, 80)], false).is_neutral());
        assert_eq!(strict.evaluate(&[person(0.8, 210, 100)], false).severity, 0.8);
    }

    #[test]
    fn test_mock_fall() {
        let judgment = FallEvaluator::default().evaluate(&[], true);
        assert_eq!(judgment.severity, 0.7);
        assert_eq!(judgment.explanation, "[MOCK] A fall has been detected.");
        assert_eq!(judgment.categories, vec![EventType::Fall]);
    }
}
