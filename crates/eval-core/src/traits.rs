use crate::{EvalError, LabeledStream, RunSummary};

/// Trait for unsupervised outlier models over a scaled feature series.
///
/// Implementations own their fit state: constructed unfit, fitted by `fit`,
/// refreshed wholesale by `refit`. Predicting on an unfitted model fails
/// with `EvalError::ModelNotFitted`.
pub trait OutlierDetector: Send + Sync {
    fn fit(&mut self, data: &[f64]) -> Result<(), EvalError>;

    /// Indices of the points labeled as outliers, ascending.
    fn predict(&self, data: &[f64]) -> Result<Vec<usize>, EvalError>;

    /// Full refit on new data (not an incremental update).
    fn refit(&mut self, data: &[f64]) -> Result<(), EvalError> {
        self.fit(data)
    }
}

/// Trait for sources that produce a labeled stream to evaluate against.
pub trait StreamSource: Send + Sync {
    fn generate(&mut self) -> Result<LabeledStream, EvalError>;
}

/// Trait for the error-reporting collaborator injected into the
/// orchestrator. Reporting logs and returns; it never panics.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &EvalError);
}

/// Trait for display layers consuming a finished run. Rendering is purely
/// presentational and never feeds back into the evaluation.
pub trait StreamSink: Send + Sync {
    fn render(&mut self, summary: &RunSummary) -> Result<(), EvalError>;
}
