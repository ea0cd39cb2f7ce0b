//! Arbitrator - folds per-detection judgments into one final judgment.

use evc_models::Judgment;

/// Pick the most severe judgment.
///
/// Ties keep the earliest judgment. Severities are never averaged. An empty
/// input yields [`Judgment::no_event`].
pub fn arbitrate(judgments: Vec<Judgment>) -> Judgment {
    let mut best: Option<Judgment> = None;
    for judgment in judgments {
        match &best {
            Some(current) if judgment.severity <= current.severity => {}
            _ => best = Some(judgment),
        }
    }
    best.unwrap_or_else(Judgment::no_event)
}
