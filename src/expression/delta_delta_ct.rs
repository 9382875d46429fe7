//! Delta-delta Ct relative to the control condition and fold change

use std::collections::HashMap;

use crate::data::{DeltaCt, DeltaDeltaCt};
use crate::diagnostics::{AnalysisWarning, UndefinedQuantity, Warnings};
use crate::stats::mean;

/// Fold change from a delta-delta Ct: 2^(-ddCt)
pub fn fold_change(delta_delta_ct: f64) -> f64 {
    2f64.powf(-delta_delta_ct)
}

/// Mean control-condition delta Ct for every target gene, computed from the
/// full control population before any row is normalized
pub fn control_baselines<'a>(
    delta_ct_rows: &'a [DeltaCt],
    control_condition: &str,
) -> HashMap<&'a str, f64> {
    let mut control_values: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in delta_ct_rows.iter().filter(|r| r.condition == control_condition) {
        control_values
            .entry(row.target_gene.as_str())
            .or_default()
            .push(row.delta_ct);
    }

    control_values
        .into_iter()
        .filter_map(|(gene, values)| mean(&values).map(|m| (gene, m)))
        .collect()
}

/// Compute delta-delta Ct = delta Ct - control mean delta Ct, and fold change,
/// for every row (control rows included)
///
/// Genes without any control-condition row have an undefined baseline; all of
/// their delta-delta Ct and fold-change values are `None` and one warning is
/// recorded per gene.
///
/// Output is grouped by target gene in order of first appearance, preserving
/// input order within each gene.
pub fn compute_delta_delta_ct(
    delta_ct_rows: &[DeltaCt],
    control_condition: &str,
) -> (Vec<DeltaDeltaCt>, Warnings) {
    let baselines = control_baselines(delta_ct_rows, control_condition);

    let mut gene_order: Vec<&str> = Vec::new();
    let mut by_gene: HashMap<&str, Vec<&DeltaCt>> = HashMap::new();
    for row in delta_ct_rows {
        let gene = row.target_gene.as_str();
        by_gene
            .entry(gene)
            .or_insert_with(|| {
                gene_order.push(gene);
                Vec::new()
            })
            .push(row);
    }

    let mut warnings = Warnings::new();
    let mut results = Vec::with_capacity(delta_ct_rows.len());

    for gene in gene_order {
        let baseline = baselines.get(gene).copied();
        let rows = &by_gene[gene];

        if baseline.is_none() {
            warnings.push(AnalysisWarning::UndefinedValue {
                quantity: UndefinedQuantity::ControlBaseline,
                gene: gene.to_string(),
                condition: None,
                sample_id: None,
                reason: format!(
                    "no '{}' rows; fold change undefined for {} rows",
                    control_condition,
                    rows.len()
                ),
            });
        }

        for row in rows {
            let delta_delta_ct = baseline.map(|b| row.delta_ct - b);
            let fc = delta_delta_ct
                .map(fold_change)
                .filter(|fc| fc.is_finite() && *fc > 0.0);
            if let (Some(ddct), None) = (delta_delta_ct, fc) {
                warnings.push(AnalysisWarning::UndefinedValue {
                    quantity: UndefinedQuantity::FoldChange,
                    gene: gene.to_string(),
                    condition: Some(row.condition.clone()),
                    sample_id: Some(row.sample_id.clone()),
                    reason: format!("2^-{} is not a positive finite number", ddct),
                });
            }
            results.push(DeltaDeltaCt {
                sample_id: row.sample_id.clone(),
                condition: row.condition.clone(),
                biological_replicate: row.biological_replicate.clone(),
                target_gene: row.target_gene.clone(),
                delta_ct: row.delta_ct,
                control_mean_delta_ct: baseline,
                delta_delta_ct,
                fold_change: fc,
            });
        }
    }

    log::info!(
        "Calculated delta-delta Ct and fold change for {} measurements",
        results.len()
    );

    (results, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn delta(sample: &str, gene: &str, condition: &str, delta_ct: f64) -> DeltaCt {
        DeltaCt {
            sample_id: sample.to_string(),
            condition: condition.to_string(),
            biological_replicate: "1".to_string(),
            target_gene: gene.to_string(),
            reference_gene: "GAPDH".to_string(),
            target_ct: 18.0 + delta_ct,
            reference_ct: 18.0,
            delta_ct,
        }
    }

    #[test]
    fn test_control_centers_at_one() {
        let rows = vec![
            delta("C1", "IL6", "Control", 4.1),
            delta("C2", "IL6", "Control", 4.1),
            delta("T1", "IL6", "LPS", 2.1),
        ];
        let (ddct, warnings) = compute_delta_delta_ct(&rows, "Control");
        assert!(warnings.is_empty());
        assert_eq!(ddct.len(), 3);

        assert!(ddct[0].delta_delta_ct.unwrap().abs() < 1e-12);
        assert!((ddct[0].fold_change.unwrap() - 1.0).abs() < 1e-12);

        // ddCt = 2.1 - 4.1 = -2 -> 4-fold
        assert!((ddct[2].delta_delta_ct.unwrap() + 2.0).abs() < 1e-12);
        assert!((ddct[2].fold_change.unwrap() - 4.0).abs() < 1e-12);
        assert!((ddct[2].control_mean_delta_ct.unwrap() - 4.1).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_independent_of_row_order() {
        let forward = vec![
            delta("C1", "IL6", "Control", 3.0),
            delta("T1", "IL6", "LPS", 1.0),
            delta("C2", "IL6", "Control", 5.0),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let (a, _) = compute_delta_delta_ct(&forward, "Control");
        let (b, _) = compute_delta_delta_ct(&reversed, "Control");

        let treated_a = a.iter().find(|r| r.sample_id == "T1").unwrap();
        let treated_b = b.iter().find(|r| r.sample_id == "T1").unwrap();
        assert_eq!(treated_a.delta_delta_ct, Some(-3.0));
        assert_eq!(treated_a.delta_delta_ct, treated_b.delta_delta_ct);
    }

    #[test]
    fn test_gene_without_control_is_undefined() {
        let rows = vec![
            delta("C1", "IL6", "Control", 4.0),
            delta("T1", "IL6", "LPS", 2.0),
            delta("T1", "TNF", "LPS", 6.0),
            delta("T2", "TNF", "LPS", 6.5),
        ];
        let (ddct, warnings) = compute_delta_delta_ct(&rows, "Control");

        let tnf: Vec<&DeltaDeltaCt> = ddct.iter().filter(|r| r.target_gene == "TNF").collect();
        assert_eq!(tnf.len(), 2);
        for row in tnf {
            assert_eq!(row.control_mean_delta_ct, None);
            assert_eq!(row.delta_delta_ct, None);
            assert_eq!(row.fold_change, None);
        }

        let il6 = ddct.iter().find(|r| r.sample_id == "T1" && r.target_gene == "IL6").unwrap();
        assert_eq!(il6.fold_change, Some(4.0));
        assert_eq!(warnings.undefined_count(UndefinedQuantity::ControlBaseline), 1);
    }

    #[test]
    fn test_unrepresentable_fold_change_is_undefined() {
        let rows = vec![
            delta("C1", "IL6", "Control", 0.0),
            delta("T1", "IL6", "LPS", 2000.0),
        ];
        let (ddct, warnings) = compute_delta_delta_ct(&rows, "Control");
        assert_eq!(ddct[1].delta_delta_ct, Some(2000.0));
        assert_eq!(ddct[1].fold_change, None);
        assert_eq!(warnings.undefined_count(UndefinedQuantity::FoldChange), 1);
    }

    #[test]
    fn test_grouped_by_gene_first_appearance() {
        let rows = vec![
            delta("C1", "TNF", "Control", 5.0),
            delta("C1", "IL6", "Control", 4.0),
            delta("C2", "TNF", "Control", 5.0),
        ];
        let (ddct, _) = compute_delta_delta_ct(&rows, "Control");
        let genes: Vec<&str> = ddct.iter().map(|r| r.target_gene.as_str()).collect();
        assert_eq!(genes, vec!["TNF", "TNF", "IL6"]);
    }

    proptest! {
        #[test]
        fn prop_fold_change_positive_and_exact(
            control in prop::collection::vec(-15.0f64..25.0, 1..8),
            treated in prop::collection::vec(-15.0f64..25.0, 0..8),
        ) {
            let mut rows: Vec<DeltaCt> = control
                .iter()
                .enumerate()
                .map(|(i, &d)| delta(&format!("C{}", i), "IL6", "Control", d))
                .collect();
            rows.extend(
                treated
                    .iter()
                    .enumerate()
                    .map(|(i, &d)| delta(&format!("T{}", i), "IL6", "LPS", d)),
            );

            let (ddct, warnings) = compute_delta_delta_ct(&rows, "Control");
            prop_assert!(warnings.is_empty());
            for row in &ddct {
                let d = row.delta_delta_ct.unwrap();
                let fc = row.fold_change.unwrap();
                prop_assert!(fc > 0.0);
                prop_assert_eq!(fc, 2f64.powf(-d));
            }
        }
    }
}
