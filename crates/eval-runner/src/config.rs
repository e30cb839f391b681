use anyhow::Result;
use outlier_model::ForestConfig;
use serde::{Deserialize, Serialize};
use std::env;
use stream_generator::GeneratorConfig;
use stream_renderer::RenderConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    // Stream generation
    pub num_points: usize,
    pub noise_level: f64,
    pub anomaly_freq: f64,
    pub trend_factor: f64,
    pub seasonality_period: usize,
    pub anomaly_magnitude: f64,
    pub drift_frequency: usize,

    // Outlier model
    pub contamination: f64,
    pub n_estimators: usize,

    // Drift detection
    pub drift_window: usize,
    pub drift_threshold: f64,

    // Scoring
    pub tolerance: usize,

    // Rendering
    pub render_stream: bool,
    pub batch_size: usize,
    pub update_interval_ms: u64,

    /// Shared RNG seed for the generator and the model; unset means a
    /// fresh random run every time.
    pub seed: Option<u64>,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            num_points: env::var("NUM_POINTS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            noise_level: env::var("NOISE_LEVEL")
                .unwrap_or_else(|_| "0.05".to_string())
                .parse()?,
            anomaly_freq: env::var("ANOMALY_FREQ")
                .unwrap_or_else(|_| "0.04".to_string())
                .parse()?,
            trend_factor: env::var("TREND_FACTOR")
                .unwrap_or_else(|_| "0.001".to_string())
                .parse()?,
            seasonality_period: env::var("SEASONALITY_PERIOD")
                .unwrap_or_else(|_| "150".to_string())
                .parse()?,
            anomaly_magnitude: env::var("ANOMALY_MAGNITUDE")
                .unwrap_or_else(|_| "4.0".to_string())
                .parse()?,
            drift_frequency: env::var("DRIFT_FREQUENCY")
                .unwrap_or_else(|_| "700".to_string())
                .parse()?,

            contamination: env::var("CONTAMINATION")
                .unwrap_or_else(|_| "0.05".to_string())
                .parse()?,
            n_estimators: env::var("N_ESTIMATORS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()?,

            drift_window: env::var("DRIFT_WINDOW")
                .unwrap_or_else(|_| "50".to_string())
                .parse()?,
            drift_threshold: env::var("DRIFT_THRESHOLD")
                .unwrap_or_else(|_| "0.2".to_string())
                .parse()?,

            tolerance: env::var("TOLERANCE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,

            render_stream: env::var("RENDER_STREAM")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,
            batch_size: env::var("BATCH_SIZE")
                .unwrap_or_else(|_| "50".to_string())
                .parse()?,
            update_interval_ms: env::var("UPDATE_INTERVAL_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,

            seed: match env::var("EVAL_SEED") {
                Ok(value) => Some(value.parse()?),
                Err(_) => None,
            },
        };

        Ok(config)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            num_points: self.num_points,
            noise_level: self.noise_level,
            anomaly_freq: self.anomaly_freq,
            trend_factor: self.trend_factor,
            seasonality_period: self.seasonality_period,
            anomaly_magnitude: self.anomaly_magnitude,
            drift_frequency: self.drift_frequency,
            seed: self.seed,
        }
    }

    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            contamination: self.contamination,
            n_estimators: self.n_estimators,
            seed: self.seed,
            ..ForestConfig::default()
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            batch_size: self.batch_size,
            update_interval_ms: self.update_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = RunnerConfig::from_env().unwrap();

        assert_eq!(config.num_points, 1000);
        assert_eq!(config.n_estimators, 200);
        assert_eq!(config.drift_window, 50);
        assert_eq!(config.tolerance, 5);
        assert!(config.seed.is_none());
    }
}
