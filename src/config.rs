//! Analysis settings shared by the library driver and the command line

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QpcrError, Result};
use crate::testing::{CorrectionMethod, SignificanceParams, TestPairing, DEFAULT_CORRECTIONS};

fn default_reference_gene() -> String {
    "GAPDH".to_string()
}

fn default_control_condition() -> String {
    "Control".to_string()
}

fn default_alpha() -> f64 {
    0.05
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_corrections() -> Vec<CorrectionMethod> {
    DEFAULT_CORRECTIONS.to_vec()
}

/// Settings for one qPCR analysis run
///
/// Every field has a default, so a JSON config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Housekeeping gene used for delta Ct normalization
    #[serde(default = "default_reference_gene")]
    pub reference_gene: String,
    /// Baseline condition for delta-delta Ct and for every comparison
    #[serde(default = "default_control_condition")]
    pub control_condition: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Bonferroni and FDR are always applied; other methods are added on top
    #[serde(default = "default_corrections")]
    pub corrections: Vec<CorrectionMethod>,
    #[serde(default)]
    pub pairing: TestPairing,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_gene: default_reference_gene(),
            control_condition: default_control_condition(),
            alpha: default_alpha(),
            confidence_level: default_confidence_level(),
            corrections: default_corrections(),
            pairing: TestPairing::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load settings from a JSON file and validate them
    ///
    /// The loaded correction list always includes Bonferroni and FDR.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config.with_applied_corrections())
    }

    /// Replace `corrections` with the methods a run actually applies
    pub fn with_applied_corrections(mut self) -> Self {
        self.corrections = self.significance_params().corrections();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference_gene.trim().is_empty() {
            return Err(QpcrError::InvalidInput {
                reason: "reference gene must not be empty".to_string(),
            });
        }
        if self.control_condition.trim().is_empty() {
            return Err(QpcrError::InvalidInput {
                reason: "control condition must not be empty".to_string(),
            });
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(QpcrError::InvalidInput {
                reason: format!("alpha must be in (0, 1), got {}", self.alpha),
            });
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(QpcrError::InvalidInput {
                reason: format!(
                    "confidence level must be in (0, 1), got {}",
                    self.confidence_level
                ),
            });
        }
        Ok(())
    }

    /// Settings for the significance engine
    pub fn significance_params(&self) -> SignificanceParams {
        SignificanceParams {
            alpha: self.alpha,
            confidence_level: self.confidence_level,
            pairing: self.pairing,
            extra_corrections: self
                .corrections
                .iter()
                .copied()
                .filter(|m| !DEFAULT_CORRECTIONS.contains(m))
                .collect(),
        }
    }
}
