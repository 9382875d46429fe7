//! Derived expression records produced by the expression calculator

use serde::{Deserialize, Serialize};

/// Technical replicates of one (sample, gene, condition, biological replicate)
/// collapsed to a mean Ct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateMean {
    pub sample_id: String,
    pub gene: String,
    pub condition: String,
    pub biological_replicate: String,
    /// Mean of the valid technical Ct values; None if none were valid
    pub mean_ct: Option<f64>,
    /// Sample standard deviation; None with fewer than two valid values
    pub std_ct: Option<f64>,
    /// Number of valid technical replicates averaged
    pub n_technical: usize,
    /// Number of technical replicates flagged invalid and excluded
    pub n_invalid: usize,
}

/// Target Ct normalized to the reference gene for one biological replicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaCt {
    pub sample_id: String,
    pub condition: String,
    pub biological_replicate: String,
    pub target_gene: String,
    pub reference_gene: String,
    pub target_ct: f64,
    pub reference_ct: f64,
    pub delta_ct: f64,
}

/// Delta Ct relative to the control-condition baseline, with fold change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaDeltaCt {
    pub sample_id: String,
    pub condition: String,
    pub biological_replicate: String,
    pub target_gene: String,
    pub delta_ct: f64,
    /// Mean delta Ct of the control condition for this gene
    pub control_mean_delta_ct: Option<f64>,
    pub delta_delta_ct: Option<f64>,
    /// 2^(-delta_delta_ct); strictly positive when defined
    pub fold_change: Option<f64>,
}
