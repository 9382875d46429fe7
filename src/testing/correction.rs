//! P-value adjustment methods for multiple testing correction
//!
//! Implements:
//! - Bonferroni family-wise error rate correction
//! - Holm step-down correction (family-wise, uniformly more powerful than Bonferroni)
//! - Benjamini-Hochberg step-up FDR correction
//!
//! m is the number of comparisons, defined or not: an undefined (NaN) p-value
//! stays undefined but still counts toward m. Ranking breaks ties by original
//! position, and every method returns adjusted values in the original input
//! order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QpcrError;
use crate::io::{CorrectedPValue, TestResult};

/// Multiple-comparison procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectionMethod {
    #[serde(rename = "bonferroni")]
    Bonferroni,
    #[serde(rename = "holm")]
    Holm,
    #[serde(rename = "fdr_bh")]
    FdrBh,
}

impl CorrectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionMethod::Bonferroni => "bonferroni",
            CorrectionMethod::Holm => "holm",
            CorrectionMethod::FdrBh => "fdr_bh",
        }
    }

    /// Adjust a set of raw p-values with this procedure
    pub fn adjust(&self, pvalues: &[f64]) -> Vec<f64> {
        match self {
            CorrectionMethod::Bonferroni => bonferroni(pvalues),
            CorrectionMethod::Holm => holm(pvalues),
            CorrectionMethod::FdrBh => benjamini_hochberg(pvalues),
        }
    }
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionMethod {
    type Err = QpcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bonferroni" => Ok(CorrectionMethod::Bonferroni),
            "holm" => Ok(CorrectionMethod::Holm),
            "fdr_bh" | "fdr" | "bh" => Ok(CorrectionMethod::FdrBh),
            other => Err(QpcrError::InvalidInput {
                reason: format!(
                    "Unknown correction method '{}'. Use: bonferroni, holm, or fdr_bh",
                    other
                ),
            }),
        }
    }
}

/// Indices of defined p-values in ascending order, ties by original index
fn ascending_order(pvalues: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..pvalues.len())
        .filter(|&i| !pvalues[i].is_nan())
        .collect();
    // Stable sort keeps equal p-values in input order
    indices.sort_by(|&a, &b| pvalues[a].total_cmp(&pvalues[b]));
    indices
}

/// Apply Bonferroni correction to p-values
///
/// corrected = min(1, p * m). No ranking is involved.
pub fn bonferroni(pvalues: &[f64]) -> Vec<f64> {
    let m = pvalues.len();
    pvalues
        .iter()
        .map(|&p| {
            if p.is_nan() {
                f64::NAN
            } else {
                (p * m as f64).min(1.0)
            }
        })
        .collect()
}

/// Apply Holm step-down correction to p-values
///
/// At 0-based ascending rank k: min(1, p_(k) * (m - k)), then a forward
/// sweep raises each value to at least the one before it.
pub fn holm(pvalues: &[f64]) -> Vec<f64> {
    let order = ascending_order(pvalues);
    let m = pvalues.len();

    let mut padj = vec![f64::NAN; pvalues.len()];
    let mut cummax = f64::NEG_INFINITY;

    for (k, &i) in order.iter().enumerate() {
        let adj = (pvalues[i] * (m - k) as f64).min(1.0);
        cummax = cummax.max(adj);
        padj[i] = cummax;
    }

    padj
}

/// Apply Benjamini-Hochberg FDR correction to p-values
///
/// At 1-based ascending rank r: min(1, p_(r) * m / r), then a backward sweep
/// from the largest p-value lowers each value to at most the one after it.
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let order = ascending_order(pvalues);
    let m = pvalues.len();

    let mut padj = vec![f64::NAN; pvalues.len()];
    let mut cummin = f64::INFINITY;

    for (k, &i) in order.iter().enumerate().rev() {
        let adj = (pvalues[i] * m as f64 / (k + 1) as f64).min(1.0);
        cummin = cummin.min(adj);
        padj[i] = cummin;
    }

    padj
}

/// Apply one correction across exactly the given comparisons
///
/// Returns a new table in the same row order with a corrected p-value column
/// for `method` appended (replacing any earlier column for the same method).
/// Significance uses each row's own alpha.
pub fn correct(results: &[TestResult], method: CorrectionMethod) -> Vec<TestResult> {
    let raw: Vec<f64> = results
        .iter()
        .map(|r| r.p_value.unwrap_or(f64::NAN))
        .collect();
    let adjusted = method.adjust(&raw);

    log::debug!(
        "Applied {} correction to {} comparisons ({} without a p-value)",
        method,
        raw.len(),
        raw.iter().filter(|p| p.is_nan()).count()
    );

    results
        .iter()
        .zip(adjusted)
        .map(|(result, padj)| {
            let p_value = if padj.is_nan() { None } else { Some(padj) };
            let mut corrected = result.clone();
            corrected.corrections.retain(|c| c.method != method);
            corrected.corrections.push(CorrectedPValue {
                method,
                p_value,
                significant: p_value.map_or(false, |p| p < result.alpha),
            });
            corrected
        })
        .collect()
}
