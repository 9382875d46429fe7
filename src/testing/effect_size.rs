//! Standardized effect size for two-group comparisons

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stats::{mean, pooled_std, sample_variance};

/// Conventional magnitude label for |d|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSize {
    /// |d| < 0.2 negligible, < 0.5 small, < 0.8 medium, otherwise large
    pub fn from_cohens_d(d: f64) -> Self {
        let magnitude = d.abs();
        if magnitude < 0.2 {
            EffectSize::Negligible
        } else if magnitude < 0.5 {
            EffectSize::Small
        } else if magnitude < 0.8 {
            EffectSize::Medium
        } else {
            EffectSize::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectSize::Negligible => "negligible",
            EffectSize::Small => "small",
            EffectSize::Medium => "medium",
            EffectSize::Large => "large",
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cohen's d of treatment relative to control using the pooled SD
///
/// None when either group has fewer than two values or the pooled SD is zero.
pub fn cohens_d(control: &[f64], treatment: &[f64]) -> Option<f64> {
    let var_c = sample_variance(control)?;
    let var_t = sample_variance(treatment)?;
    let sd = pooled_std(control.len(), var_c, treatment.len(), var_t)?;
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }
    Some((mean(treatment)? - mean(control)?) / sd)
}
