//! Relative expression by the delta-delta Ct method
//!
//! Raw Ct values flow through three stages, each producing a new table:
//! technical replicate averaging, normalization to a reference gene (delta Ct),
//! and normalization to the control condition (delta-delta Ct, fold change).

mod delta_ct;
mod delta_delta_ct;
mod replicates;
mod summary;

pub use delta_ct::compute_delta_ct;
pub use delta_delta_ct::{compute_delta_delta_ct, control_baselines, fold_change};
pub use replicates::average_technical_replicates;
pub use summary::{summarize_expression, ExpressionSummary};

use serde::Serialize;

use crate::data::{DeltaCt, DeltaDeltaCt, Measurement, ReplicateMean};
use crate::diagnostics::Warnings;
use crate::error::Result;

/// Tables produced by one expression calculation
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionAnalysis {
    pub replicate_means: Vec<ReplicateMean>,
    pub delta_ct: Vec<DeltaCt>,
    pub delta_delta_ct: Vec<DeltaDeltaCt>,
    pub warnings: Warnings,
}

impl ExpressionAnalysis {
    /// Distinct target genes in the fold-change table
    pub fn target_genes(&self) -> Vec<&str> {
        let mut genes: Vec<&str> = Vec::new();
        for row in &self.delta_delta_ct {
            if !genes.contains(&row.target_gene.as_str()) {
                genes.push(row.target_gene.as_str());
            }
        }
        genes
    }

    /// Distinct samples in the fold-change table
    pub fn sample_ids(&self) -> Vec<&str> {
        let mut samples: Vec<&str> = self
            .delta_delta_ct
            .iter()
            .map(|r| r.sample_id.as_str())
            .collect();
        samples.sort_unstable();
        samples.dedup();
        samples
    }
}

/// Reduces raw measurements to a fold-change table for one reference gene and
/// one control condition
#[derive(Debug, Clone)]
pub struct ExpressionCalculator {
    reference_gene: String,
    control_condition: String,
}

impl ExpressionCalculator {
    pub fn new(reference_gene: &str, control_condition: &str) -> Self {
        Self {
            reference_gene: reference_gene.to_string(),
            control_condition: control_condition.to_string(),
        }
    }

    pub fn reference_gene(&self) -> &str {
        &self.reference_gene
    }

    pub fn control_condition(&self) -> &str {
        &self.control_condition
    }

    /// Run replicate averaging, delta Ct and delta-delta Ct in sequence
    pub fn run(&self, measurements: &[Measurement]) -> Result<ExpressionAnalysis> {
        log::info!(
            "Running expression analysis (reference: {}, control: {})",
            self.reference_gene,
            self.control_condition
        );

        let (replicate_means, mut warnings) = average_technical_replicates(measurements)?;

        let (delta_ct, delta_warnings) = compute_delta_ct(&replicate_means, &self.reference_gene)?;
        warnings.extend(delta_warnings);

        let (delta_delta_ct, ddct_warnings) =
            compute_delta_delta_ct(&delta_ct, &self.control_condition);
        warnings.extend(ddct_warnings);

        let analysis = ExpressionAnalysis {
            replicate_means,
            delta_ct,
            delta_delta_ct,
            warnings,
        };

        log::info!(
            "Analyzed {} target genes across {} samples",
            analysis.target_genes().len(),
            analysis.sample_ids().len()
        );

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QpcrError;

    #[test]
    fn test_calculator_worked_example() {
        // Two control samples with identical delta Ct -> baseline 4.1
        let data = vec![
            Measurement::new("C1", "GAPDH", "Control", "1", "1", 18.0),
            Measurement::new("C1", "GAPDH", "Control", "1", "2", 18.2),
            Measurement::new("C1", "IL6", "Control", "1", "1", 22.0),
            Measurement::new("C1", "IL6", "Control", "1", "2", 22.4),
            Measurement::new("C2", "GAPDH", "Control", "2", "1", 19.0),
            Measurement::new("C2", "GAPDH", "Control", "2", "2", 19.2),
            Measurement::new("C2", "IL6", "Control", "2", "1", 23.0),
            Measurement::new("C2", "IL6", "Control", "2", "2", 23.4),
        ];
        let calculator = ExpressionCalculator::new("GAPDH", "Control");
        let analysis = calculator.run(&data).unwrap();

        assert_eq!(analysis.replicate_means.len(), 4);
        assert_eq!(analysis.delta_ct.len(), 2);
        for row in &analysis.delta_ct {
            assert!((row.delta_ct - 4.1).abs() < 1e-9);
        }
        for row in &analysis.delta_delta_ct {
            assert!(row.delta_delta_ct.unwrap().abs() < 1e-9);
            assert!((row.fold_change.unwrap() - 1.0).abs() < 1e-9);
        }
        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.target_genes(), vec!["IL6"]);
        assert_eq!(analysis.sample_ids(), vec!["C1", "C2"]);
    }

    #[test]
    fn test_calculator_missing_reference() {
        let data = vec![Measurement::new("C1", "IL6", "Control", "1", "1", 22.0)];
        let calculator = ExpressionCalculator::new("ACTB", "Control");
        assert!(matches!(
            calculator.run(&data),
            Err(QpcrError::ReferenceGeneNotFound { .. })
        ));
    }
}
