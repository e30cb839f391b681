use eval_core::{EvalError, LabeledStream, StreamSource};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::f64::consts::PI;

/// Parameters for synthetic stream generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Total number of points in the stream.
    pub num_points: usize,

    /// Standard deviation of the Gaussian noise term.
    pub noise_level: f64,

    /// Fraction of points that receive an anomaly spike (0.0 to 1.0).
    pub anomaly_freq: f64,

    /// Slope of the linear trend component.
    pub trend_factor: f64,

    /// Period of the sinusoidal seasonality component.
    pub seasonality_period: usize,

    /// Lower bound of the anomaly spike; spikes are drawn uniformly from
    /// [magnitude, 2 * magnitude).
    pub anomaly_magnitude: f64,

    /// Every `drift_frequency` points the baseline shifts by a uniform
    /// [-1, 1) amount for the remainder of the stream.
    pub drift_frequency: usize,

    /// Fixed RNG seed for reproducible streams.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_points: 1000,
            noise_level: 0.05,
            anomaly_freq: 0.05,
            trend_factor: 0.001,
            seasonality_period: 200,
            anomaly_magnitude: 4.0,
            drift_frequency: 700,
            seed: None,
        }
    }
}

/// Synthesizes a stream with trend, seasonality, noise, baseline drift,
/// and labeled anomaly spikes.
pub struct StreamGenerator {
    config: GeneratorConfig,
}

impl StreamGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn validate(&self) -> Result<(), EvalError> {
        let c = &self.config;
        if c.num_points == 0 {
            return Err(EvalError::EmptyInput(
                "generator asked for a zero-length stream".to_string(),
            ));
        }
        if c.seasonality_period == 0 {
            return Err(EvalError::InvalidParameter(
                "seasonality_period must be at least 1".to_string(),
            ));
        }
        if c.drift_frequency == 0 {
            return Err(EvalError::InvalidParameter(
                "drift_frequency must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&c.anomaly_freq) {
            return Err(EvalError::InvalidParameter(format!(
                "anomaly_freq must be in [0, 1], got {}",
                c.anomaly_freq
            )));
        }
        if c.anomaly_magnitude < 0.0 {
            return Err(EvalError::InvalidParameter(format!(
                "anomaly_magnitude must be non-negative, got {}",
                c.anomaly_magnitude
            )));
        }
        Ok(())
    }

    /// Generate one labeled stream according to the config.
    pub fn generate_stream(&self) -> Result<LabeledStream, EvalError> {
        self.validate()?;
        let c = &self.config;
        let n = c.num_points;

        let mut rng = match c.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let normal =
            Normal::new(0.0, 1.0).map_err(|e| EvalError::InvalidParameter(e.to_string()))?;

        let period = c.seasonality_period as f64;
        let mut values: Vec<f64> = Vec::with_capacity(n);
        let mut baseline = 0.0;

        for i in 0..n {
            // Baseline drift: a fresh shift at every drift_frequency boundary
            // (including i = 0) carries through to the end of the stream.
            if i % c.drift_frequency == 0 {
                baseline += rng.gen_range(-1.0..1.0);
            }

            let x = i as f64;
            let trend = c.trend_factor * x;
            let seasonality =
                (2.0 * PI * x / period).sin() + (4.0 * PI * x / period).cos();
            let noise = c.noise_level * normal.sample(&mut rng);

            values.push(trend + seasonality + noise + baseline);
        }

        // Spike a distinct random subset of positions.
        let num_anomalies = (n as f64 * c.anomaly_freq) as usize;
        let mut positions: Vec<usize> = (0..n).collect();
        positions.shuffle(&mut rng);
        let mut anomalies = positions[..num_anomalies].to_vec();
        anomalies.sort_unstable();

        if c.anomaly_magnitude > 0.0 {
            for &idx in &anomalies {
                values[idx] += rng.gen_range(c.anomaly_magnitude..c.anomaly_magnitude * 2.0);
            }
        }

        Ok(LabeledStream { values, anomalies })
    }
}

impl StreamSource for StreamGenerator {
    fn generate(&mut self) -> Result<LabeledStream, EvalError> {
        self.generate_stream()
    }
}
