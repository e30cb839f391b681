//! eval-runner: synthesize a labeled stream, detect outliers and drift,
//! refit on drift, and score the detections against ground truth.
//!
//! All parameters come from the environment (or a `.env` file):
//!
//!   cargo run -p eval-runner
//!   NUM_POINTS=2000 DRIFT_THRESHOLD=0.3 cargo run -p eval-runner
//!   EVAL_SEED=42 RENDER_STREAM=false cargo run -p eval-runner

use anomaly_scorer::AnomalyScorer;
use anyhow::bail;
use drift_detector::RollingDriftDetector;
use eval_core::{RunOutcome, StreamSink};
use eval_orchestrator::EvaluationOrchestrator;
use outlier_model::IsolationForest;
use stream_generator::StreamGenerator;
use stream_renderer::BatchRenderer;

mod config;

use config::RunnerConfig;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let config = RunnerConfig::from_env()?;
    tracing::info!(config = %serde_json::to_string(&config)?, "starting evaluation run");

    let generator = StreamGenerator::new(config.generator_config());
    let model = IsolationForest::from_config(config.forest_config())?;

    let mut orchestrator = EvaluationOrchestrator::new(Box::new(generator), Box::new(model))
        .with_drift_detector(RollingDriftDetector::new(
            config.drift_window,
            config.drift_threshold,
        ))
        .with_scorer(AnomalyScorer::new(config.tolerance));

    match orchestrator.run() {
        RunOutcome::Completed(summary) => {
            tracing::info!(
                true_positives = summary.score.true_positives,
                false_positives = summary.score.false_positives,
                false_negatives = summary.score.false_negatives,
                precision = summary.score.precision(),
                recall = summary.score.recall(),
                f1 = summary.score.f1_score(),
                drift_points = summary.drift_points.len(),
                drift_refit_performed = summary.drift_refit_performed,
                "evaluation complete"
            );

            if config.render_stream {
                let mut renderer = BatchRenderer::new(config.render_config());
                if let Err(e) = renderer.render(&summary) {
                    tracing::warn!("stream rendering failed: {e}");
                }
            }

            Ok(())
        }
        RunOutcome::AbortedBeforePrediction { reason } => {
            bail!("run aborted before prediction: {reason}")
        }
        RunOutcome::AbortedBeforeScoring { reason } => {
            bail!("run aborted before scoring: {reason}")
        }
    }
}
