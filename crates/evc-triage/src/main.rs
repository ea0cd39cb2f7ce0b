//! Single-frame emergency analysis CLI.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use evc_triage::{analyze_with_timeout, init_tracing, Judgment, Orchestrator, TriageConfig};
use evc_vision::{LazyDetector, SourceDescriptor, VisionConfig};

#[derive(Parser, Debug)]
#[command(name = "evc-analyze", version, about = "Analyze one frame for emergencies")]
struct Cli {
    /// `webcam` or a path to an image or video file
    #[arg(required_unless_present_any = ["stdin", "schema"])]
    source: Option<String>,

    /// Return the deterministic mock judgment for every routed detection
    #[arg(long, env = "EVC_MOCK")]
    mock: bool,

    /// Read uploaded image or video bytes from standard input
    #[arg(long, conflicts_with = "source")]
    stdin: bool,

    /// Print the JSON Schema of the judgment and exit
    #[arg(long)]
    schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if cli.schema {
        let schema = schemars::schema_for!(Judgment);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let vision_config = VisionConfig::from_env();
    let triage_config = TriageConfig::from_env();
    info!("Vision config: {:?}", vision_config);

    let detector = Arc::new(LazyDetector::yolo(vision_config.clone()));
    if let Err(e) = detector.initialize() {
        warn!("Detector failed to initialize, analyses will report it: {}", e);
    }

    let orchestrator = Arc::new(Orchestrator::from_config(
        &vision_config,
        &triage_config,
        detector,
    )?);

    let judgment = if cli.stdin {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read uploaded bytes from stdin")?;
        analyze_with_timeout(
            orchestrator,
            SourceDescriptor::Bytes(bytes),
            cli.mock,
            triage_config.analysis_timeout,
        )
        .await
    } else {
        let source = cli.source.unwrap_or_default();
        match SourceDescriptor::parse(&source) {
            Ok(descriptor) => {
                analyze_with_timeout(
                    orchestrator,
                    descriptor,
                    cli.mock,
                    triage_config.analysis_timeout,
                )
                .await
            }
            Err(_) => orchestrator.analyze_source(&source, cli.mock),
        }
    };

    println!("{}", serde_json::to_string_pretty(&judgment)?);
    Ok(())
}
