//! Structured analysis logging.
//!
//! Every analysis runs inside an `analysis` span carrying a fresh analysis
//! id, the source kind and the mock flag, so stage logs from the vision
//! crate are attributable to one call.

use tracing::{error, info, warn, Span};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Install the global tracing subscriber.
///
/// Colored text by default, JSON when `LOG_FORMAT=json`. Output goes to
/// stderr so stdout stays free for judgments.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let env_filter = ["evc=info", "ort=warn", "onnxruntime=warn"]
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(env_filter, |filter, directive| filter.add_directive(directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if use_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if installed.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Logger for one `analyze` call.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    analysis_id: String,
    source_kind: &'static str,
    mock: bool,
}

impl AnalysisLogger {
    /// Create a logger with a fresh analysis id.
    pub fn new(source_kind: &'static str, mock: bool) -> Self {
        Self {
            analysis_id: Uuid::new_v4().to_string(),
            source_kind,
            mock,
        }
    }

    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    pub fn source_kind(&self) -> &'static str {
        self.source_kind
    }

    pub fn mock(&self) -> bool {
        self.mock
    }

    /// Create the `analysis` span for this call.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            analysis_id = %self.analysis_id,
            source = self.source_kind,
            mock = self.mock
        )
    }

    pub fn log_start(&self) {
        info!(analysis_id = %self.analysis_id, "Analysis started");
    }

    pub fn log_completion(&self, severity: f64, categories: usize) {
        info!(
            analysis_id = %self.analysis_id,
            severity,
            categories,
            "Analysis completed"
        );
    }

    pub fn log_failure(&self, stage: &str, message: &str) {
        error!(
            analysis_id = %self.analysis_id,
            stage,
            "Analysis failed: {}", message
        );
    }
}
