//! Raw per-reaction qPCR measurements

use serde::{Deserialize, Serialize};

/// Upper limit on a meaningful Ct value (number of PCR cycles run)
pub const CT_CEILING: f64 = 40.0;

/// One qPCR reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub sample_id: String,
    pub gene: String,
    pub condition: String,
    pub biological_replicate: String,
    pub technical_replicate: String,
    /// Cycle threshold; NaN marks a failed reaction
    pub ct_value: f64,
}

impl Measurement {
    pub fn new(
        sample_id: &str,
        gene: &str,
        condition: &str,
        biological_replicate: &str,
        technical_replicate: &str,
        ct_value: f64,
    ) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            gene: gene.to_string(),
            condition: condition.to_string(),
            biological_replicate: biological_replicate.to_string(),
            technical_replicate: technical_replicate.to_string(),
            ct_value,
        }
    }

    /// Whether the Ct value is usable: present, positive, and within the cycle ceiling
    pub fn has_valid_ct(&self) -> bool {
        is_valid_ct(self.ct_value)
    }

    /// Ct value as an explicit optional (None for a failed reaction)
    pub fn ct(&self) -> Option<f64> {
        if self.ct_value.is_nan() {
            None
        } else {
            Some(self.ct_value)
        }
    }

    /// Identifier fields that are empty
    pub(crate) fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sample_id.trim().is_empty() {
            missing.push("sample_id");
        }
        if self.gene.trim().is_empty() {
            missing.push("gene");
        }
        if self.condition.trim().is_empty() {
            missing.push("condition");
        }
        if self.biological_replicate.trim().is_empty() {
            missing.push("biological_replicate");
        }
        missing
    }
}

/// Ct validity rule: not NaN, > 0 and <= [`CT_CEILING`]
pub fn is_valid_ct(ct: f64) -> bool {
    ct.is_finite() && ct > 0.0 && ct <= CT_CEILING
}
