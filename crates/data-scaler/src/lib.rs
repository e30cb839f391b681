use eval_core::EvalError;

/// Standardize a series to zero mean and unit variance.
///
/// Uses the population standard deviation. A zero-variance series is only
/// mean-centered (the divisor falls back to 1.0), matching the usual
/// standard-scaler convention.
pub fn scale(values: &[f64]) -> Result<Vec<f64>, EvalError> {
    if values.is_empty() {
        return Err(EvalError::EmptyInput("the data stream is empty".to_string()));
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let divisor = if std_dev > f64::EPSILON { std_dev } else { 1.0 };

    Ok(values.iter().map(|v| (v - mean) / divisor).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_series_is_standardized() {
        let values: Vec<f64> = (0..100).map(|i| 3.0 + 0.5 * i as f64).collect();
        let scaled = scale(&values).unwrap();

        let n = scaled.len() as f64;
        let mean = scaled.iter().sum::<f64>() / n;
        let variance = scaled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        assert!(mean.abs() < 1e-9);
        assert!((variance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series_is_centered() {
        let scaled = scale(&[7.0; 10]).unwrap();
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(scale(&[]), Err(EvalError::EmptyInput(_))));
    }
}
