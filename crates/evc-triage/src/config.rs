//! Evaluator thresholds and pipeline limits.

use std::time::Duration;

/// Triage configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    /// Minimum person confidence (exclusive) for fall analysis
    pub fall_confidence_threshold: f64,
    /// Minimum width/height ratio (exclusive) for a horizontal posture
    pub fall_aspect_ratio_threshold: f64,
    /// Minimum fire confidence (exclusive)
    pub fire_confidence_threshold: f64,
    /// Minimum smoke confidence (exclusive)
    pub smoke_confidence_threshold: f64,
    /// Minimum drowning confidence (exclusive)
    pub drowning_confidence_threshold: f64,
    /// Minimum overdose confidence (exclusive)
    pub overdose_confidence_threshold: f64,
    /// Caller-side limit for one analysis
    pub analysis_timeout: Duration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            fall_confidence_threshold: 0.5,
            fall_aspect_ratio_threshold: 1.5,
            fire_confidence_threshold: 0.5,
            smoke_confidence_threshold: 0.5,
            drowning_confidence_threshold: 0.5,
            overdose_confidence_threshold: 0.5,
            analysis_timeout: Duration::from_secs(30),
        }
    }
}

impl TriageConfig {
    /// Create config from environment variables.
    ///
    /// Missing or out-of-range values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fall_confidence_threshold: unit_var("EVC_FALL_CONFIDENCE")
                .unwrap_or(defaults.fall_confidence_threshold),
            fall_aspect_ratio_threshold: std::env::var("EVC_FALL_ASPECT_RATIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.fall_aspect_ratio_threshold),
            fire_confidence_threshold: unit_var("EVC_FIRE_CONFIDENCE")
                .unwrap_or(defaults.fire_confidence_threshold),
            smoke_confidence_threshold: unit_var("EVC_SMOKE_CONFIDENCE")
                .unwrap_or(defaults.smoke_confidence_threshold),
            drowning_confidence_threshold: unit_var("EVC_DROWNING_CONFIDENCE")
                .unwrap_or(defaults.drowning_confidence_threshold),
            overdose_confidence_threshold: unit_var("EVC_OVERDOSE_CONFIDENCE")
                .unwrap_or(defaults.overdose_confidence_threshold),
            analysis_timeout: Duration::from_secs(
                std::env::var("EVC_ANALYSIS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|v: &u64| *v > 0)
                    .unwrap_or(defaults.analysis_timeout.as_secs()),
            ),
        }
    }
}

fn unit_var(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| (0.0..=1.0).contains(v))
}
