use eval_core::MatchResult;
use serde::{Deserialize, Serialize};

/// Matches detected anomaly indices against ground-truth indices under a
/// positional tolerance.
///
/// Counting runs as two independent passes rather than a bipartite
/// matching: a detected index is a true positive if *any* ground-truth
/// index lies within the tolerance, and a ground-truth index is a false
/// negative if *no* detected index does. One true anomaly matched by
/// several nearby detections therefore contributes several true positives
/// while removing only itself from the false-negative count. This
/// asymmetry is the metric's defined behavior; switching to one-to-one
/// matching would change the counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyScorer {
    /// Maximum index distance at which a detection matches a true anomaly.
    pub tolerance: usize,
}

impl Default for AnomalyScorer {
    fn default() -> Self {
        Self { tolerance: 5 }
    }
}

impl AnomalyScorer {
    pub fn new(tolerance: usize) -> Self {
        Self { tolerance }
    }

    /// Score `detected` against `ground_truth`.
    ///
    /// Both inputs are order-independent index sets and may be empty.
    /// Always holds: `true_positives + false_positives == detected.len()`.
    pub fn score(&self, detected: &[usize], ground_truth: &[usize]) -> MatchResult {
        let mut true_positives = 0;
        let mut false_positives = 0;

        for &d in detected {
            if ground_truth.iter().any(|&t| d.abs_diff(t) <= self.tolerance) {
                true_positives += 1;
            } else {
                false_positives += 1;
            }
        }

        let false_negatives = ground_truth
            .iter()
            .filter(|&&t| detected.iter().all(|&d| d.abs_diff(t) > self.tolerance))
            .count();

        MatchResult {
            true_positives,
            false_positives,
            false_negatives,
        }
    }
}
