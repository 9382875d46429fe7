//! Normalize target genes to a reference gene (delta Ct)

use std::collections::{BTreeMap, BTreeSet};

use crate::data::{DeltaCt, ReplicateMean};
use crate::diagnostics::{AnalysisWarning, UndefinedQuantity, Warnings};
use crate::error::{QpcrError, Result};

type SampleKey<'a> = (&'a str, &'a str, &'a str);

/// Compute delta Ct = target mean Ct - reference mean Ct per
/// (sample, condition, biological replicate) and target gene
///
/// A row is emitted only when both the target and the reference mean are
/// defined. A target that was assayed for a sample but could not be paired
/// with a reference value is reported as an undefined delta Ct; a target that
/// was never assayed for the sample is skipped silently.
///
/// Rows are ordered by (sample, condition, biological replicate), then by
/// target gene name.
///
/// # Errors
/// `QpcrError::ReferenceGeneNotFound` if no replicate mean belongs to the reference gene.
pub fn compute_delta_ct(
    replicate_means: &[ReplicateMean],
    reference_gene: &str,
) -> Result<(Vec<DeltaCt>, Warnings)> {
    if !replicate_means.iter().any(|r| r.gene == reference_gene) {
        return Err(QpcrError::ReferenceGeneNotFound {
            gene: reference_gene.to_string(),
        });
    }

    // (sample, condition, bio rep) -> gene -> mean Ct
    let mut by_sample: BTreeMap<SampleKey, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
    let mut target_genes: BTreeSet<&str> = BTreeSet::new();

    for r in replicate_means {
        let key = (
            r.sample_id.as_str(),
            r.condition.as_str(),
            r.biological_replicate.as_str(),
        );
        by_sample.entry(key).or_default().insert(r.gene.as_str(), r.mean_ct);
        if r.gene != reference_gene {
            target_genes.insert(r.gene.as_str());
        }
    }

    let mut warnings = Warnings::new();
    let mut rows = Vec::new();

    for ((sample_id, condition, biological_replicate), genes) in &by_sample {
        let reference_ct = genes.get(reference_gene).copied().flatten();

        for &target_gene in &target_genes {
            let target_ct = match genes.get(target_gene) {
                Some(ct) => *ct,
                None => {
                    log::debug!(
                        "{} not assayed for sample {} (bio rep {})",
                        target_gene,
                        sample_id,
                        biological_replicate
                    );
                    continue;
                }
            };

            match (target_ct, reference_ct) {
                (Some(target_ct), Some(reference_ct)) => rows.push(DeltaCt {
                    sample_id: sample_id.to_string(),
                    condition: condition.to_string(),
                    biological_replicate: biological_replicate.to_string(),
                    target_gene: target_gene.to_string(),
                    reference_gene: reference_gene.to_string(),
                    target_ct,
                    reference_ct,
                    delta_ct: target_ct - reference_ct,
                }),
                (target_ct, _) => {
                    let reason = if target_ct.is_none() {
                        "no valid target Ct".to_string()
                    } else {
                        format!("no valid {} Ct for this sample", reference_gene)
                    };
                    warnings.push(AnalysisWarning::UndefinedValue {
                        quantity: UndefinedQuantity::DeltaCt,
                        gene: target_gene.to_string(),
                        condition: Some(condition.to_string()),
                        sample_id: Some(sample_id.to_string()),
                        reason,
                    });
                }
            }
        }
    }

    log::info!(
        "Calculated delta Ct for {} measurements ({} target genes, reference {})",
        rows.len(),
        target_genes.len(),
        reference_gene
    );

    Ok((rows, warnings))
}
