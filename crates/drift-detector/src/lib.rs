use eval_core::EvalError;
use serde::{Deserialize, Serialize};

/// Flags points where the rolling mean of a series shifts abruptly.
///
/// The rolling mean is computed over every fully-populated window
/// ("valid" mode). Whenever two consecutive rolling-mean values differ by
/// more than `threshold`, the point one window past the averaged region is
/// flagged as a drift point. Pure function of its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingDriftDetector {
    pub window_size: usize,
    pub threshold: f64,
}

impl Default for RollingDriftDetector {
    fn default() -> Self {
        Self {
            window_size: 50,
            threshold: 0.2,
        }
    }
}

impl RollingDriftDetector {
    pub fn new(window_size: usize, threshold: f64) -> Self {
        Self {
            window_size,
            threshold,
        }
    }

    /// Detect drift points in `series`.
    ///
    /// Returned indices are positions in `series` (not the rolling-mean
    /// array), ascending and duplicate-free, each in
    /// `[window_size, series.len() - 1]`.
    pub fn detect(&self, series: &[f64]) -> Result<Vec<usize>, EvalError> {
        if self.window_size == 0 {
            return Err(EvalError::InvalidParameter(
                "window size must be at least 1".to_string(),
            ));
        }
        if self.window_size > series.len() {
            return Err(EvalError::InvalidParameter(format!(
                "window size {} exceeds series length {}",
                self.window_size,
                series.len()
            )));
        }

        let w = self.window_size;
        let rolling: Vec<f64> = series
            .windows(w)
            .map(|win| win.iter().sum::<f64>() / w as f64)
            .collect();

        let mut drift_points = Vec::new();
        for k in 1..rolling.len() {
            if (rolling[k] - rolling[k - 1]).abs() > self.threshold {
                let idx = k + w;
                // The final rolling-mean pair maps one past the series end;
                // drift indices must be valid series positions.
                if idx < series.len() {
                    drift_points.push(idx);
                }
            }
        }

        Ok(drift_points)
    }
}
