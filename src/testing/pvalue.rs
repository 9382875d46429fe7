//! P-values and critical values from the Student t distribution

use statrs::distribution::{Continuous, ContinuousCDF, StudentsT};

/// Newton refinements applied to the t quantile
const NEWTON_STEPS: usize = 4;

/// Two-sided p-value for a t statistic with `df` degrees of freedom
///
/// Returns NaN for a non-finite statistic or non-positive df.
pub fn two_sided_pvalue_t(stat: f64, df: f64) -> f64 {
    if !stat.is_finite() || df <= 0.0 {
        return f64::NAN;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => (2.0 * t_dist.cdf(-stat.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

/// Quantile of the t distribution at probability `prob`
///
/// With `prob = 1 - alpha/2` this is the two-sided critical value.
/// Returns NaN for non-positive df or a probability outside (0, 1).
pub fn t_critical(prob: f64, df: f64) -> f64 {
    if df <= 0.0 || !(prob > 0.0 && prob < 1.0) {
        return f64::NAN;
    }

    let t_dist = match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => t_dist,
        Err(_) => return f64::NAN,
    };

    // Polish the library quantile with Newton steps on the CDF
    let mut x = t_dist.inverse_cdf(prob);
    for _ in 0..NEWTON_STEPS {
        let density = t_dist.pdf(x);
        if density <= 0.0 || !density.is_finite() {
            break;
        }
        let step = (t_dist.cdf(x) - prob) / density;
        x -= step;
        if step.abs() < 1e-14 {
            break;
        }
    }
    x
}
