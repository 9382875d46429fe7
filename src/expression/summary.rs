//! Per gene and condition summary of expression values

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::DeltaDeltaCt;
use crate::stats::{mean, sample_std};

/// Descriptive statistics of one (gene, condition) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSummary {
    pub gene: String,
    pub condition: String,
    /// Rows with a defined fold change
    pub n: usize,
    pub fold_change_mean: Option<f64>,
    pub fold_change_std: Option<f64>,
    pub delta_ct_mean: Option<f64>,
    pub delta_ct_std: Option<f64>,
    pub delta_delta_ct_mean: Option<f64>,
    pub delta_delta_ct_std: Option<f64>,
}

/// Summarize delta Ct, delta-delta Ct and fold change per (gene, condition),
/// sorted by gene then condition
pub fn summarize_expression(rows: &[DeltaDeltaCt]) -> Vec<ExpressionSummary> {
    let mut groups: BTreeMap<(&str, &str), Vec<&DeltaDeltaCt>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.target_gene.as_str(), row.condition.as_str()))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((gene, condition), members)| {
            let delta_ct: Vec<f64> = members.iter().map(|r| r.delta_ct).collect();
            let ddct: Vec<f64> = members.iter().filter_map(|r| r.delta_delta_ct).collect();
            let fc: Vec<f64> = members.iter().filter_map(|r| r.fold_change).collect();

            ExpressionSummary {
                gene: gene.to_string(),
                condition: condition.to_string(),
                n: fc.len(),
                fold_change_mean: mean(&fc),
                fold_change_std: sample_std(&fc),
                delta_ct_mean: mean(&delta_ct),
                delta_ct_std: sample_std(&delta_ct),
                delta_delta_ct_mean: mean(&ddct),
                delta_delta_ct_std: sample_std(&ddct),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gene: &str, condition: &str, delta_ct: f64, ddct: Option<f64>) -> DeltaDeltaCt {
        DeltaDeltaCt {
            sample_id: "S".to_string(),
            condition: condition.to_string(),
            biological_replicate: "1".to_string(),
            target_gene: gene.to_string(),
            delta_ct,
            control_mean_delta_ct: ddct.map(|d| delta_ct - d),
            delta_delta_ct: ddct,
            fold_change: ddct.map(|d| 2f64.powf(-d)),
        }
    }

    #[test]
    fn test_summary_groups_sorted() {
        let rows = vec![
            row("TNF", "LPS", 3.0, Some(-1.0)),
            row("IL6", "LPS", 2.0, Some(-2.0)),
            row("IL6", "Control", 4.0, Some(0.0)),
            row("IL6", "LPS", 2.0, Some(-2.0)),
        ];
        let summary = summarize_expression(&rows);
        let keys: Vec<(&str, &str)> = summary
            .iter()
            .map(|s| (s.gene.as_str(), s.condition.as_str()))
            .collect();
        assert_eq!(keys, vec![("IL6", "Control"), ("IL6", "LPS"), ("TNF", "LPS")]);

        let il6_lps = &summary[1];
        assert_eq!(il6_lps.n, 2);
        assert_eq!(il6_lps.fold_change_mean, Some(4.0));
        assert_eq!(il6_lps.fold_change_std, Some(0.0));
        assert_eq!(summary[0].fold_change_std, None);
    }

    #[test]
    fn test_undefined_fold_changes_excluded() {
        let rows = vec![row("TNF", "LPS", 3.0, None), row("TNF", "LPS", 3.5, None)];
        let summary = summarize_expression(&rows);
        assert_eq!(summary[0].n, 0);
        assert_eq!(summary[0].fold_change_mean, None);
        assert_eq!(summary[0].delta_ct_mean, Some(3.25));
    }
}
