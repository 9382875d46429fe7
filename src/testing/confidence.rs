//! Confidence intervals of the mean fold change per gene and condition

use std::collections::BTreeMap;

use super::pvalue::t_critical;
use crate::data::DeltaDeltaCt;
use crate::io::ConfidenceInterval;
use crate::stats::{mean, sample_std};

/// t-based interval for every (gene, condition) group with at least two
/// defined fold changes, sorted by gene then condition
///
/// Margin = t(1 - (1 - level) / 2, n - 1) * std / sqrt(n).
pub fn confidence_intervals(
    table: &[DeltaDeltaCt],
    confidence_level: f64,
) -> Vec<ConfidenceInterval> {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for row in table {
        if let Some(fc) = row.fold_change {
            groups
                .entry((row.target_gene.as_str(), row.condition.as_str()))
                .or_default()
                .push(fc);
        }
    }

    let quantile = 1.0 - (1.0 - confidence_level) / 2.0;

    groups
        .into_iter()
        .filter_map(|((gene, condition), values)| {
            let n = values.len();
            let (m, std) = match (mean(&values), sample_std(&values)) {
                (Some(m), Some(std)) => (m, std),
                _ => {
                    log::debug!("Skipping interval for {} / {}: n = {}", gene, condition, n);
                    return None;
                }
            };

            let se = std / (n as f64).sqrt();
            let margin = if se == 0.0 {
                0.0
            } else {
                t_critical(quantile, (n - 1) as f64) * se
            };

            Some(ConfidenceInterval {
                gene: gene.to_string(),
                condition: condition.to_string(),
                mean: m,
                std,
                n,
                se,
                ci_lower: m - margin,
                ci_upper: m + margin,
                ci_width: 2.0 * margin,
                confidence_level,
            })
        })
        .collect()
}
