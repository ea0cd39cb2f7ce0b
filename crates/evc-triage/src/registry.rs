//! Evaluator Registry - maps detection labels to category evaluators.

use evc_models::EventType;

use crate::config::TriageConfig;
use crate::evaluators::CategoryEvaluator;

/// Static label routes. Labels not listed here (including `"pose"`) are skipped.
pub static ROUTES: &[(&str, EventType)] = &[
    ("person", EventType::Fall),
    ("fire", EventType::Fire),
    ("smoke", EventType::Smoke),
    ("drowning", EventType::Drowning),
    ("overdose", EventType::Overdose),
];

/// Label-keyed evaluator table.
#[derive(Debug, Clone)]
pub struct EvaluatorRegistry {
    entries: Vec<(&'static str, CategoryEvaluator)>,
}

impl EvaluatorRegistry {
    /// Build one evaluator per route from configuration.
    pub fn new(config: &TriageConfig) -> Self {
        let entries = ROUTES
            .iter()
            .map(|(label, event_type)| {
                (*label, CategoryEvaluator::for_category(*event_type, config))
            })
            .collect();
        Self { entries }
    }

    /// The evaluator responsible for a label, if any.
    pub fn lookup(&self, label: &str) -> Option<&CategoryEvaluator> {
        self.entries
            .iter()
            .find(|(route, _)| *route == label)
            .map(|(_, evaluator)| evaluator)
    }

    /// Labels that have an evaluator.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::new(&TriageConfig::default())
    }
}
