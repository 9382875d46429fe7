//! Statistical result tables produced by the significance engine

use serde::{Deserialize, Serialize};

use crate::diagnostics::Warnings;
use crate::testing::{CorrectionMethod, EffectSize, TestPairing};

/// P-value adjusted by one multiple-comparison procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedPValue {
    pub method: CorrectionMethod,
    /// Adjusted p-value; None when the raw p-value was undefined
    pub p_value: Option<f64>,
    /// corrected p < alpha
    pub significant: bool,
}

/// One treatment-versus-control comparison for one gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub gene: String,
    /// Treatment condition compared against the control
    pub condition: String,
    /// "<treatment> vs <control>"
    pub comparison: String,
    pub control_mean: f64,
    pub control_std: f64,
    pub control_n: usize,
    pub treatment_mean: f64,
    pub treatment_std: f64,
    pub treatment_n: usize,
    /// treatment_mean - control_mean
    pub mean_difference: f64,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    /// raw p < alpha
    pub significant: bool,
    pub cohens_d: Option<f64>,
    pub effect_size: Option<EffectSize>,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// control_n + treatment_n - 2
    pub degrees_freedom: usize,
    /// Test actually run (a paired request may fall back to independent)
    pub pairing: TestPairing,
    pub alpha: f64,
    /// Corrected p-values, one per procedure applied
    pub corrections: Vec<CorrectedPValue>,
}

impl TestResult {
    /// Corrected p-value column for a procedure, if it has been applied
    pub fn corrected(&self, method: CorrectionMethod) -> Option<&CorrectedPValue> {
        self.corrections.iter().find(|c| c.method == method)
    }

    /// Whether the comparison is significant after the given correction
    pub fn significant_after(&self, method: CorrectionMethod) -> bool {
        self.corrected(method).map_or(false, |c| c.significant)
    }
}

/// Confidence interval of the mean fold change for one (gene, condition) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub gene: String,
    pub condition: String,
    pub mean: f64,
    pub std: f64,
    pub n: usize,
    /// Standard error of the mean
    pub se: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub ci_width: f64,
    pub confidence_level: f64,
}

/// Tally of significant comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub total_comparisons: usize,
    pub significant_raw: usize,
    pub significant_bonferroni: usize,
    pub significant_fdr: usize,
    pub alpha: f64,
}

impl StatisticalSummary {
    pub fn from_results(results: &[TestResult], alpha: f64) -> Self {
        Self {
            total_comparisons: results.len(),
            significant_raw: results.iter().filter(|r| r.significant).count(),
            significant_bonferroni: results
                .iter()
                .filter(|r| r.significant_after(CorrectionMethod::Bonferroni))
                .count(),
            significant_fdr: results
                .iter()
                .filter(|r| r.significant_after(CorrectionMethod::FdrBh))
                .count(),
            alpha,
        }
    }
}

impl std::fmt::Display for StatisticalSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "qPCR Statistical Summary")?;
        writeln!(f, "========================")?;
        writeln!(f, "Total comparisons: {}", self.total_comparisons)?;
        writeln!(
            f,
            "Significant (uncorrected, p < {}): {}/{}",
            self.alpha, self.significant_raw, self.total_comparisons
        )?;
        writeln!(
            f,
            "Significant (Bonferroni): {}/{}",
            self.significant_bonferroni, self.total_comparisons
        )?;
        writeln!(
            f,
            "Significant (FDR): {}/{}",
            self.significant_fdr, self.total_comparisons
        )?;
        Ok(())
    }
}

/// Everything one statistical run produces
#[derive(Debug, Clone, Serialize)]
pub struct StatisticalReport {
    pub results: Vec<TestResult>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
    pub summary: StatisticalSummary,
    pub warnings: Warnings,
}
