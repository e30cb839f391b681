use eval_core::{EvalError, RunSummary, StreamSink};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Points rendered per batch.
    pub batch_size: usize,

    /// Pause between batches, simulating a live stream.
    pub update_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            update_interval_ms: 100,
        }
    }
}

/// One rendered slice of the stream with its statistics and overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub start: usize,
    pub end: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub detected: Vec<usize>,
    pub drift_points: Vec<usize>,
    pub true_anomalies: Vec<usize>,
}

/// Split a finished run into per-batch reports covering the whole series.
pub fn batch_reports(summary: &RunSummary, batch_size: usize) -> Vec<BatchReport> {
    let values = &summary.stream.values;
    let mut reports = Vec::new();
    let mut start = 0;

    while start < values.len() {
        let end = (start + batch_size).min(values.len());
        let slice = &values[start..end];

        let n = slice.len() as f64;
        let mean = slice.iter().sum::<f64>() / n;
        let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = slice.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let in_batch = |indices: &[usize]| -> Vec<usize> {
            indices
                .iter()
                .copied()
                .filter(|&i| i >= start && i < end)
                .collect()
        };

        reports.push(BatchReport {
            start,
            end,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            detected: in_batch(&summary.detected),
            drift_points: in_batch(&summary.drift_points),
            true_anomalies: in_batch(&summary.stream.anomalies),
        });

        start = end;
    }

    reports
}

/// Replays a finished run batch by batch with a fixed delay, narrating
/// batch statistics and the anomaly/drift overlays that fall inside each
/// batch. Purely presentational.
pub struct BatchRenderer {
    config: RenderConfig,
}

impl BatchRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl Default for BatchRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl StreamSink for BatchRenderer {
    fn render(&mut self, summary: &RunSummary) -> Result<(), EvalError> {
        if self.config.batch_size == 0 {
            return Err(EvalError::InvalidParameter(
                "batch_size must be at least 1".to_string(),
            ));
        }

        for report in batch_reports(summary, self.config.batch_size) {
            tracing::info!(
                start = report.start,
                end = report.end,
                mean = report.mean,
                std_dev = report.std_dev,
                min = report.min,
                max = report.max,
                detected = ?report.detected,
                drift = ?report.drift_points,
                true_anomalies = ?report.true_anomalies,
                "stream batch"
            );

            if self.config.update_interval_ms > 0 {
                thread::sleep(Duration::from_millis(self.config.update_interval_ms));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eval_core::{LabeledStream, MatchResult};

    fn summary(points: usize) -> RunSummary {
        RunSummary {
            stream: LabeledStream {
                values: (0..points).map(|i| i as f64).collect(),
                anomalies: vec![3, 60],
            },
            detected: vec![4, 59, 70],
            drift_points: vec![55],
            drift_refit_performed: true,
            score: MatchResult {
                true_positives: 2,
                false_positives: 1,
                false_negatives: 0,
            },
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_batches_cover_the_whole_series() {
        let reports = batch_reports(&summary(130), 50);

        assert_eq!(reports.len(), 3);
        assert_eq!((reports[0].start, reports[0].end), (0, 50));
        assert_eq!((reports[2].start, reports[2].end), (100, 130));
    }

    #[test]
    fn test_overlays_land_in_their_batches() {
        let reports = batch_reports(&summary(130), 50);

        assert_eq!(reports[0].detected, vec![4]);
        assert_eq!(reports[0].true_anomalies, vec![3]);
        assert_eq!(reports[1].detected, vec![59, 70]);
        assert_eq!(reports[1].drift_points, vec![55]);
        assert_eq!(reports[1].true_anomalies, vec![60]);
        assert!(reports[2].detected.is_empty());
    }

    #[test]
    fn test_batch_statistics() {
        let reports = batch_reports(&summary(100), 100);
        let report = &reports[0];

        assert!((report.mean - 49.5).abs() < 1e-9);
        assert_eq!(report.min, 0.0);
        assert_eq!(report.max, 99.0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut renderer = BatchRenderer::new(RenderConfig {
            batch_size: 0,
            update_interval_ms: 0,
        });

        assert!(matches!(
            renderer.render(&summary(10)),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_render_completes_without_delay() {
        let mut renderer = BatchRenderer::new(RenderConfig {
            batch_size: 25,
            update_interval_ms: 0,
        });

        renderer.render(&summary(130)).unwrap();
    }
}
