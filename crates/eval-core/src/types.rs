use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated series paired with its oracle anomaly labels.
///
/// `values` is ordered by time (index = position in the stream) and is
/// immutable once produced; `anomalies` holds the ascending indices of the
/// injected anomalies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledStream {
    pub values: Vec<f64>,
    pub anomalies: Vec<usize>,
}

impl LabeledStream {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Detection-accuracy counts from matching detected against true anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl MatchResult {
    /// TP / (TP + FP), or 0.0 when nothing was detected.
    pub fn precision(&self) -> f64 {
        let detected = self.true_positives + self.false_positives;
        if detected == 0 {
            return 0.0;
        }
        self.true_positives as f64 / detected as f64
    }

    /// TP / (TP + FN), or 0.0 when there were no true anomalies.
    pub fn recall(&self) -> f64 {
        let relevant = self.true_positives + self.false_negatives;
        if relevant == 0 {
            return 0.0;
        }
        self.true_positives as f64 / relevant as f64
    }

    /// Harmonic mean of precision and recall.
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

/// Everything a completed evaluation run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// The stream the run evaluated, kept for the display layer.
    pub stream: LabeledStream,

    /// Indices the outlier model flagged, ascending.
    pub detected: Vec<usize>,

    /// Indices where the rolling mean shifted past the drift threshold.
    pub drift_points: Vec<usize>,

    /// Whether drift triggered a full model refit during the run.
    pub drift_refit_performed: bool,

    pub score: MatchResult,

    pub completed_at: DateTime<Utc>,
}

/// Outcome of one evaluation run.
///
/// Failures are split by how far the run got: before the model produced
/// predictions there is nothing to score, while a failure in the drift or
/// refit stage aborts a run that already holds predictions. Callers must
/// handle both instead of assuming a score exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed(RunSummary),
    AbortedBeforePrediction { reason: String },
    AbortedBeforeScoring { reason: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}
