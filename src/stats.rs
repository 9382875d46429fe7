//! Descriptive statistics shared across modules
//!
//! All helpers return `None` instead of a number when the statistic is not
//! defined for the given sample size, so callers can propagate missing values
//! rather than inventing zeros.

/// Arithmetic mean; None for an empty slice
///
/// Accumulates deviations from the first value, so a sample of identical
/// values returns that value exactly.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (&first, _) = values.split_first()?;
    let shift: f64 = values.iter().map(|&x| x - first).sum::<f64>() / values.len() as f64;
    Some(first + shift)
}

/// Unbiased sample variance (n - 1 denominator); None with fewer than 2 values
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|&x| (x - m).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// Sample standard deviation; None with fewer than 2 values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Pooled standard deviation of two groups from their sizes and sample variances
///
/// sqrt(((n1 - 1) * var1 + (n2 - 1) * var2) / (n1 + n2 - 2))
pub fn pooled_std(n1: usize, var1: f64, n2: usize, var2: f64) -> Option<f64> {
    if n1 + n2 <= 2 {
        return None;
    }
    let n1 = n1 as f64;
    let n2 = n2 as f64;
    let pooled_var = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / (n1 + n2 - 2.0);
    Some(pooled_var.sqrt())
}
