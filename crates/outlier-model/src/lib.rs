use eval_core::{EvalError, OutlierDetector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::consts::EULER_MASCHERONI;
use std::cmp::Ordering;

/// Subsample size per tree, capped at the data length.
const DEFAULT_MAX_SAMPLES: usize = 256;

/// Configuration for the isolation-forest ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Expected proportion of outliers, in (0, 0.5].
    pub contamination: f64,

    /// Number of trees in the ensemble.
    pub n_estimators: usize,

    /// Per-tree subsample size (capped at the data length at fit time).
    pub max_samples: usize,

    /// Fixed RNG seed for reproducible fits.
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            n_estimators: 100,
            max_samples: DEFAULT_MAX_SAMPLES,
            seed: None,
        }
    }
}

/// Unsupervised ensemble outlier detector over a univariate feature series.
///
/// Each tree isolates points by recursive random splits over a random
/// subsample; points with short average path lengths are easy to isolate
/// and score high. Constructed unfit; `fit` builds the ensemble, `predict`
/// flags the `ceil(contamination * len)` highest-scoring indices.
pub struct IsolationForest {
    config: ForestConfig,
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    pub fn new(contamination: f64, n_estimators: usize) -> Result<Self, EvalError> {
        Self::from_config(ForestConfig {
            contamination,
            n_estimators,
            ..ForestConfig::default()
        })
    }

    pub fn from_config(config: ForestConfig) -> Result<Self, EvalError> {
        if !(config.contamination > 0.0 && config.contamination <= 0.5) {
            return Err(EvalError::InvalidParameter(format!(
                "contamination must be in (0, 0.5], got {}",
                config.contamination
            )));
        }
        if config.n_estimators == 0 {
            return Err(EvalError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if config.max_samples == 0 {
            return Err(EvalError::InvalidParameter(
                "max_samples must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            config,
            trees: Vec::new(),
            sample_size: 0,
        })
    }

    /// Fix the RNG seed for reproducible fits.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Build the ensemble over random subsamples of `data`.
    pub fn fit_data(&mut self, data: &[f64]) -> Result<(), EvalError> {
        if data.is_empty() {
            return Err(EvalError::EmptyInput("the data stream is empty".to_string()));
        }

        let sample_size = self.config.max_samples.min(data.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        let mut master = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..self.config.n_estimators).map(|_| master.gen()).collect();

        self.trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let subsample: Vec<f64> =
                    rand::seq::index::sample(&mut rng, data.len(), sample_size)
                        .into_iter()
                        .map(|i| data[i])
                        .collect();
                IsolationTree::build(subsample, height_limit, &mut rng)
            })
            .collect();
        self.sample_size = sample_size;

        Ok(())
    }

    /// Anomaly score in (0, 1] for a single value; higher is more anomalous.
    pub fn score(&self, value: f64) -> f64 {
        let normalizer = average_path_length(self.sample_size);
        if normalizer <= 0.0 {
            return 0.5;
        }

        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(value))
            .sum();
        let mean_path = total / self.trees.len() as f64;

        2f64.powf(-mean_path / normalizer)
    }

    /// Indices of the points labeled as outliers, ascending.
    pub fn predict_data(&self, data: &[f64]) -> Result<Vec<usize>, EvalError> {
        if self.trees.is_empty() {
            return Err(EvalError::ModelNotFitted);
        }
        if data.is_empty() {
            return Err(EvalError::EmptyInput("the data stream is empty".to_string()));
        }

        let scores: Vec<f64> = data.iter().map(|&v| self.score(v)).collect();

        // The ceil(contamination * n) highest-scoring points get the
        // outlier label.
        let flagged = ((self.config.contamination * data.len() as f64).ceil() as usize)
            .min(data.len());

        let mut order: Vec<usize> = (0..data.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal)
        });

        let mut outliers = order[..flagged].to_vec();
        outliers.sort_unstable();
        Ok(outliers)
    }
}

impl OutlierDetector for IsolationForest {
    fn fit(&mut self, data: &[f64]) -> Result<(), EvalError> {
        self.fit_data(data)
    }

    fn predict(&self, data: &[f64]) -> Result<Vec<usize>, EvalError> {
        self.predict_data(data)
    }
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn build(values: Vec<f64>, height_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: build_node(values, 0, height_limit, rng),
        }
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Leaf { size } => {
                    return depth as f64 + average_path_length(*size);
                }
                Node::Split { value: split, left, right } => {
                    node = if value < *split {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                    depth += 1;
                }
            }
        }
    }
}

fn build_node(values: Vec<f64>, depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
    if depth >= height_limit || values.len() <= 1 {
        return Node::Leaf { size: values.len() };
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= f64::EPSILON {
        return Node::Leaf { size: values.len() };
    }

    let split = rng.gen_range(min..max);
    let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|&v| v < split);

    Node::Split {
        value: split,
        left: Box::new(build_node(left, depth + 1, height_limit, rng)),
        right: Box::new(build_node(right, depth + 1, height_limit, rng)),
    }
}

/// Expected path length of an unsuccessful BST search over `n` points:
/// `c(n) = 2 * H(n-1) - 2 * (n-1) / n`, with `H(i) ~ ln(i) + gamma`.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            let harmonic = (n - 1.0).ln() + EULER_MASCHERONI;
            2.0 * harmonic - 2.0 * (n - 1.0) / n
        }
    }
}
