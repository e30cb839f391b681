use anomaly_scorer::AnomalyScorer;
use chrono::Utc;
use drift_detector::RollingDriftDetector;
use eval_core::{
    ErrorReporter, EvalError, OutlierDetector, RunOutcome, RunSummary, StreamSource,
};

/// Default error reporter: logs through tracing and returns.
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &EvalError) {
        tracing::error!("Error detected: {error}");
    }
}

/// Sequences one full evaluation run: obtain stream, scale, fit, predict,
/// detect drift, conditionally refit, score.
///
/// Owns its collaborators for the duration of the run; a fresh orchestrator
/// (with a fresh model) should be built per run. Every stage failure is
/// reported once through the injected reporter and mapped to an aborted
/// outcome.
pub struct EvaluationOrchestrator {
    source: Box<dyn StreamSource>,
    model: Box<dyn OutlierDetector>,
    drift_detector: RollingDriftDetector,
    scorer: AnomalyScorer,
    reporter: Box<dyn ErrorReporter>,
}

impl EvaluationOrchestrator {
    pub fn new(source: Box<dyn StreamSource>, model: Box<dyn OutlierDetector>) -> Self {
        Self {
            source,
            model,
            drift_detector: RollingDriftDetector::default(),
            scorer: AnomalyScorer::default(),
            reporter: Box::new(LogReporter),
        }
    }

    pub fn with_drift_detector(mut self, detector: RollingDriftDetector) -> Self {
        self.drift_detector = detector;
        self
    }

    pub fn with_scorer(mut self, scorer: AnomalyScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Execute one evaluation run.
    pub fn run(&mut self) -> RunOutcome {
        let stream = match self.source.generate() {
            Ok(stream) => stream,
            Err(e) => return self.abort_before_prediction(e),
        };
        tracing::info!(
            points = stream.values.len(),
            true_anomalies = stream.anomalies.len(),
            "stream obtained"
        );

        let scaled = match data_scaler::scale(&stream.values) {
            Ok(scaled) => scaled,
            Err(e) => return self.abort_before_prediction(e),
        };

        if let Err(e) = self.model.fit(&scaled) {
            return self.abort_before_prediction(e);
        }

        let detected = match self.model.predict(&scaled) {
            Ok(detected) => detected,
            Err(e) => return self.abort_before_prediction(e),
        };
        tracing::info!(detected = detected.len(), "model predictions ready");

        // Drift detection reads the raw series; the model sees the scaled
        // representation.
        let drift_points = match self.drift_detector.detect(&stream.values) {
            Ok(points) => points,
            Err(e) => return self.abort_before_scoring(e),
        };

        let mut drift_refit_performed = false;
        if !drift_points.is_empty() {
            tracing::info!(
                drift_points = drift_points.len(),
                "Drift detected, updating the model..."
            );
            if let Err(e) = self.model.refit(&scaled) {
                return self.abort_before_scoring(e);
            }
            drift_refit_performed = true;
            // The detections scored below come from the pre-refit model;
            // predictions are not recomputed within the same pass.
        }

        let score = self.scorer.score(&detected, &stream.anomalies);

        RunOutcome::Completed(RunSummary {
            stream,
            detected,
            drift_points,
            drift_refit_performed,
            score,
            completed_at: Utc::now(),
        })
    }

    fn abort_before_prediction(&self, error: EvalError) -> RunOutcome {
        self.reporter.report(&error);
        RunOutcome::AbortedBeforePrediction {
            reason: error.to_string(),
        }
    }

    fn abort_before_scoring(&self, error: EvalError) -> RunOutcome {
        self.reporter.report(&error);
        RunOutcome::AbortedBeforeScoring {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eval_core::LabeledStream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedSource {
        stream: LabeledStream,
    }

    impl StreamSource for FixedSource {
        fn generate(&mut self) -> Result<LabeledStream, EvalError> {
            Ok(self.stream.clone())
        }
    }

    struct FailingSource;

    impl StreamSource for FailingSource {
        fn generate(&mut self) -> Result<LabeledStream, EvalError> {
            Err(EvalError::EmptyInput("no stream available".to_string()))
        }
    }

    struct StubModel {
        detections: Vec<usize>,
        fitted: bool,
        fit_calls: Arc<AtomicUsize>,
    }

    impl StubModel {
        fn new(detections: Vec<usize>, fit_calls: Arc<AtomicUsize>) -> Self {
            Self {
                detections,
                fitted: false,
                fit_calls,
            }
        }
    }

    impl OutlierDetector for StubModel {
        fn fit(&mut self, data: &[f64]) -> Result<(), EvalError> {
            if data.is_empty() {
                return Err(EvalError::EmptyInput("empty fit input".to_string()));
            }
            self.fitted = true;
            self.fit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn predict(&self, _data: &[f64]) -> Result<Vec<usize>, EvalError> {
            if !self.fitted {
                return Err(EvalError::ModelNotFitted);
            }
            Ok(self.detections.clone())
        }
    }

    struct CountingReporter {
        reports: Arc<AtomicUsize>,
    }

    impl ErrorReporter for CountingReporter {
        fn report(&self, _error: &EvalError) {
            self.reports.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 100 flat points, then 100 at `level` (one obvious drift boundary).
    fn step_stream(level: f64, anomalies: Vec<usize>) -> LabeledStream {
        let values = (0..200)
            .map(|i| if i < 100 { 0.0 } else { level })
            .collect();
        LabeledStream { values, anomalies }
    }

    fn flat_stream(anomalies: Vec<usize>) -> LabeledStream {
        LabeledStream {
            values: vec![1.0; 200],
            anomalies,
        }
    }

    #[test]
    fn test_run_without_drift_fits_once_and_scores() {
        let fit_calls = Arc::new(AtomicUsize::new(0));
        let model = StubModel::new(vec![50, 120], fit_calls.clone());
        let source = FixedSource {
            stream: flat_stream(vec![51, 119]),
        };

        let mut orchestrator = EvaluationOrchestrator::new(Box::new(source), Box::new(model))
            .with_drift_detector(RollingDriftDetector::new(20, 0.2));
        let outcome = orchestrator.run();

        let summary = outcome.summary().expect("run should complete");
        assert!(summary.drift_points.is_empty());
        assert!(!summary.drift_refit_performed);
        assert_eq!(fit_calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.score.true_positives, 2);
        assert_eq!(summary.score.false_positives, 0);
        assert_eq!(summary.score.false_negatives, 0);
    }

    #[test]
    fn test_drift_triggers_a_single_full_refit() {
        let fit_calls = Arc::new(AtomicUsize::new(0));
        let model = StubModel::new(vec![100], fit_calls.clone());
        let source = FixedSource {
            stream: step_stream(10.0, vec![100]),
        };

        let mut orchestrator = EvaluationOrchestrator::new(Box::new(source), Box::new(model))
            .with_drift_detector(RollingDriftDetector::new(20, 0.2));
        let outcome = orchestrator.run();

        let summary = outcome.summary().expect("run should complete");
        assert!(!summary.drift_points.is_empty());
        assert!(summary.drift_refit_performed);
        // One fit plus one drift-triggered refit; predictions scored are
        // still the pre-refit ones.
        assert_eq!(fit_calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.score.true_positives, 1);
    }

    #[test]
    fn test_source_failure_aborts_before_prediction() {
        let reports = Arc::new(AtomicUsize::new(0));
        let fit_calls = Arc::new(AtomicUsize::new(0));
        let model = StubModel::new(vec![], fit_calls.clone());

        let mut orchestrator =
            EvaluationOrchestrator::new(Box::new(FailingSource), Box::new(model)).with_reporter(
                Box::new(CountingReporter {
                    reports: reports.clone(),
                }),
            );
        let outcome = orchestrator.run();

        assert!(matches!(
            outcome,
            RunOutcome::AbortedBeforePrediction { .. }
        ));
        assert_eq!(reports.load(Ordering::SeqCst), 1);
        assert_eq!(fit_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_stream_aborts_before_prediction() {
        let fit_calls = Arc::new(AtomicUsize::new(0));
        let model = StubModel::new(vec![], fit_calls.clone());
        let source = FixedSource {
            stream: LabeledStream {
                values: Vec::new(),
                anomalies: Vec::new(),
            },
        };

        let mut orchestrator = EvaluationOrchestrator::new(Box::new(source), Box::new(model));
        let outcome = orchestrator.run();

        assert!(matches!(
            outcome,
            RunOutcome::AbortedBeforePrediction { .. }
        ));
        assert_eq!(fit_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_oversized_drift_window_aborts_before_scoring() {
        let reports = Arc::new(AtomicUsize::new(0));
        let fit_calls = Arc::new(AtomicUsize::new(0));
        let model = StubModel::new(vec![10], fit_calls.clone());
        let source = FixedSource {
            stream: flat_stream(vec![10]),
        };

        let mut orchestrator = EvaluationOrchestrator::new(Box::new(source), Box::new(model))
            .with_drift_detector(RollingDriftDetector::new(500, 0.2))
            .with_reporter(Box::new(CountingReporter {
                reports: reports.clone(),
            }));
        let outcome = orchestrator.run();

        assert!(matches!(outcome, RunOutcome::AbortedBeforeScoring { .. }));
        assert_eq!(reports.load(Ordering::SeqCst), 1);
        // The model was fitted and predicted before the drift stage failed.
        assert_eq!(fit_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_to_end_with_real_generator_and_forest() {
        use outlier_model::IsolationForest;
        use stream_generator::{GeneratorConfig, StreamGenerator};

        let generator = StreamGenerator::new(GeneratorConfig {
            seed: Some(99),
            ..GeneratorConfig::default()
        });
        let forest = IsolationForest::new(0.05, 200).unwrap().with_seed(99);

        let mut orchestrator =
            EvaluationOrchestrator::new(Box::new(generator), Box::new(forest));
        let outcome = orchestrator.run();

        let summary = outcome.summary().expect("run should complete");
        assert_eq!(summary.stream.values.len(), 1000);
        assert_eq!(
            summary.score.true_positives + summary.score.false_positives,
            summary.detected.len()
        );
        assert!(summary.score.false_negatives <= summary.stream.anomalies.len());
    }
}
