//! Statistical significance of expression changes
//!
//! Tests every treatment condition against the control per gene, then applies
//! multiple-comparison corrections across all comparisons of a run and adds
//! per-group confidence intervals.

mod confidence;
mod correction;
mod effect_size;
mod pvalue;
mod ttest;

pub use confidence::confidence_intervals;
pub use correction::{benjamini_hochberg, bonferroni, correct, holm, CorrectionMethod};
pub use effect_size::{cohens_d, EffectSize};
pub use pvalue::{t_critical, two_sided_pvalue_t};
pub use ttest::{paired_t_test, student_t_test, test_each_gene, TestPairing, TwoSampleTest};

use serde::{Deserialize, Serialize};

use crate::data::DeltaDeltaCt;
use crate::io::{StatisticalReport, StatisticalSummary};

/// Corrections every full analysis applies
pub const DEFAULT_CORRECTIONS: [CorrectionMethod; 2] =
    [CorrectionMethod::Bonferroni, CorrectionMethod::FdrBh];

/// Settings for one significance run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceParams {
    /// Significance threshold for raw and corrected p-values
    pub alpha: f64,
    /// Level of the per-group confidence intervals
    pub confidence_level: f64,
    pub pairing: TestPairing,
    /// Applied after Bonferroni and FDR
    pub extra_corrections: Vec<CorrectionMethod>,
}

impl Default for SignificanceParams {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            confidence_level: 0.95,
            pairing: TestPairing::Independent,
            extra_corrections: Vec::new(),
        }
    }
}

impl SignificanceParams {
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }

    /// Bonferroni, FDR, then any extra methods, without duplicates
    pub fn corrections(&self) -> Vec<CorrectionMethod> {
        let mut methods = DEFAULT_CORRECTIONS.to_vec();
        for method in &self.extra_corrections {
            if !methods.contains(method) {
                methods.push(*method);
            }
        }
        methods
    }
}

/// Test all comparisons, correct them and compute confidence intervals
///
/// Uses 95% intervals and independent tests.
pub fn run_full_analysis(
    table: &[DeltaDeltaCt],
    control_condition: &str,
    alpha: f64,
) -> StatisticalReport {
    run_full_analysis_with_params(table, control_condition, &SignificanceParams::with_alpha(alpha))
}

/// Full significance run with explicit settings
///
/// Every correction is computed from the raw p-values of the same set of
/// comparisons, so the columns are independent of one another.
pub fn run_full_analysis_with_params(
    table: &[DeltaDeltaCt],
    control_condition: &str,
    params: &SignificanceParams,
) -> StatisticalReport {
    log::info!(
        "Running significance analysis (alpha = {}, control: {})",
        params.alpha,
        control_condition
    );

    let (mut results, warnings) =
        test_each_gene(table, control_condition, params.alpha, params.pairing);

    for method in params.corrections() {
        results = correct(&results, method);
    }

    let confidence_intervals = confidence_intervals(table, params.confidence_level);
    let summary = StatisticalSummary::from_results(&results, params.alpha);

    log::info!(
        "{} comparisons: {} significant raw, {} after Bonferroni, {} after FDR",
        summary.total_comparisons,
        summary.significant_raw,
        summary.significant_bonferroni,
        summary.significant_fdr
    );

    StatisticalReport {
        results,
        confidence_intervals,
        summary,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(gene: &str, condition: &str, values: &[f64]) -> Vec<DeltaDeltaCt> {
        values
            .iter()
            .enumerate()
            .map(|(i, &fc)| DeltaDeltaCt {
                sample_id: format!("{}_{}", condition, i + 1),
                condition: condition.to_string(),
                biological_replicate: (i + 1).to_string(),
                target_gene: gene.to_string(),
                delta_ct: 4.0,
                control_mean_delta_ct: Some(4.0),
                delta_delta_ct: Some(-fc.log2()),
                fold_change: Some(fc),
            })
            .collect()
    }

    fn two_gene_table() -> Vec<DeltaDeltaCt> {
        let mut table = rows("IL6", "Control", &[1.0, 1.2, 0.9]);
        table.extend(rows("IL6", "LPS", &[3.8, 4.2, 4.0]));
        table.extend(rows("TNF", "Control", &[1.0, 1.1, 0.9]));
        table.extend(rows("TNF", "LPS", &[1.05, 0.95, 1.1]));
        table
    }

    #[test]
    fn test_full_analysis_applies_both_corrections() {
        let report = run_full_analysis(&two_gene_table(), "Control", 0.05);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.summary.total_comparisons, 2);

        for r in &report.results {
            let bonf = r.corrected(CorrectionMethod::Bonferroni).unwrap();
            let fdr = r.corrected(CorrectionMethod::FdrBh).unwrap();
            let raw = r.p_value.unwrap();
            assert!((bonf.p_value.unwrap() - (raw * 2.0).min(1.0)).abs() < 1e-12);
            assert!(fdr.p_value.unwrap() <= bonf.p_value.unwrap());
            assert!(r.corrected(CorrectionMethod::Holm).is_none());
        }

        assert!(report.results[0].significant_after(CorrectionMethod::Bonferroni));
        assert!(!report.results[1].significant);
        assert_eq!(report.summary.significant_raw, 1);
        assert_eq!(report.confidence_intervals.len(), 4);
    }

    #[test]
    fn test_extra_corrections_appended_once() {
        let params = SignificanceParams {
            extra_corrections: vec![CorrectionMethod::Holm, CorrectionMethod::FdrBh],
            ..SignificanceParams::default()
        };
        assert_eq!(
            params.corrections(),
            vec![CorrectionMethod::Bonferroni, CorrectionMethod::FdrBh, CorrectionMethod::Holm]
        );

        let report = run_full_analysis_with_params(&two_gene_table(), "Control", &params);
        for r in &report.results {
            assert_eq!(r.corrections.len(), 3);
            assert!(r.corrected(CorrectionMethod::Holm).is_some());
        }
    }

    #[test]
    fn test_every_comparison_counts_toward_m() {
        let mut table = rows("IL6", "Control", &[1.0, 1.2, 0.9]);
        table.extend(rows("IL6", "LPS", &[1.3, 1.6, 1.2]));
        // Identical replicates, 8-fold apart
        table.extend(rows("TNF", "Control", &[1.0, 1.0]));
        table.extend(rows("TNF", "LPS", &[8.0, 8.0]));
        // Identical replicates, no change: p is undefined
        table.extend(rows("CXCL8", "Control", &[1.0, 1.0]));
        table.extend(rows("CXCL8", "LPS", &[1.0, 1.0]));

        let report = run_full_analysis(&table, "Control", 0.05);
        assert_eq!(report.summary.total_comparisons, 3);

        let il6 = &report.results[0];
        let raw = il6.p_value.unwrap();
        let bonf = il6.corrected(CorrectionMethod::Bonferroni).unwrap();
        assert!((bonf.p_value.unwrap() - (raw * 3.0).min(1.0)).abs() < 1e-12);

        let tnf = &report.results[1];
        assert_eq!(tnf.p_value, Some(0.0));
        assert!(tnf.significant_after(CorrectionMethod::Bonferroni));
        assert!(tnf.significant_after(CorrectionMethod::FdrBh));

        let cxcl8 = &report.results[2];
        assert_eq!(cxcl8.p_value, None);
        assert_eq!(cxcl8.corrected(CorrectionMethod::Bonferroni).unwrap().p_value, None);
        assert!(!cxcl8.significant_after(CorrectionMethod::FdrBh));
    }

    #[test]
    fn test_no_comparisons() {
        let table = rows("IL6", "Control", &[1.0, 1.1]);
        let report = run_full_analysis(&table, "Control", 0.05);
        assert!(report.results.is_empty());
        assert_eq!(report.summary.total_comparisons, 0);
        assert_eq!(report.confidence_intervals.len(), 1);
    }
}
