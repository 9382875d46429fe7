//! Collapse technical replicates to a mean Ct per biological replicate

use std::collections::BTreeMap;

use crate::data::{Measurement, ReplicateMean};
use crate::diagnostics::{AnalysisWarning, Warnings};
use crate::error::{QpcrError, Result};
use crate::stats::{mean, sample_std};

type ReplicateKey<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Average technical replicates sharing (sample, gene, condition, biological replicate)
///
/// Invalid Ct values (missing, <= 0, above the cycle ceiling) are excluded
/// from the mean, counted in `n_invalid`, and reported as warnings. A group
/// with no valid values keeps its row with `mean_ct = None`.
///
/// Rows are returned sorted by their grouping key.
///
/// # Errors
/// `QpcrError::Schema` if any measurement lacks an identifier field.
pub fn average_technical_replicates(
    measurements: &[Measurement],
) -> Result<(Vec<ReplicateMean>, Warnings)> {
    let mut missing: Vec<String> = Vec::new();
    for m in measurements {
        for field in m.missing_fields() {
            if !missing.iter().any(|f| f == field) {
                missing.push(field.to_string());
            }
        }
    }
    if !missing.is_empty() {
        return Err(QpcrError::Schema { missing });
    }

    let mut groups: BTreeMap<ReplicateKey, Vec<&Measurement>> = BTreeMap::new();
    for m in measurements {
        let key = (
            m.sample_id.as_str(),
            m.gene.as_str(),
            m.condition.as_str(),
            m.biological_replicate.as_str(),
        );
        groups.entry(key).or_default().push(m);
    }

    let mut warnings = Warnings::new();
    let mut rows = Vec::with_capacity(groups.len());

    for ((sample_id, gene, condition, biological_replicate), members) in groups {
        let mut valid: Vec<f64> = Vec::with_capacity(members.len());
        let mut n_invalid = 0;

        for m in members {
            if m.has_valid_ct() {
                valid.push(m.ct_value);
            } else {
                n_invalid += 1;
                warnings.push(AnalysisWarning::InvalidCt {
                    sample_id: m.sample_id.clone(),
                    gene: m.gene.clone(),
                    condition: m.condition.clone(),
                    biological_replicate: m.biological_replicate.clone(),
                    technical_replicate: m.technical_replicate.clone(),
                    ct_value: m.ct(),
                });
            }
        }

        rows.push(ReplicateMean {
            sample_id: sample_id.to_string(),
            gene: gene.to_string(),
            condition: condition.to_string(),
            biological_replicate: biological_replicate.to_string(),
            mean_ct: mean(&valid),
            std_ct: sample_std(&valid),
            n_technical: valid.len(),
            n_invalid,
        });
    }

    log::info!(
        "Averaged {} measurements into {} replicate means",
        measurements.len(),
        rows.len()
    );

    Ok((rows, warnings))
}
