//! Structured warnings collected during an analysis run
//!
//! Every pipeline stage returns a [`Warnings`] accumulator next to its output
//! table, so callers can see exactly which comparisons were skipped and which
//! values are undefined without parsing log text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quantity that could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedQuantity {
    /// Target or reference replicate mean missing for a sample
    DeltaCt,
    /// No control-condition delta Ct for a gene
    ControlBaseline,
    /// Delta-delta Ct and fold change for a sample
    FoldChange,
    /// t statistic and p-value (zero standard error)
    TestStatistic,
    /// Cohen's d (zero pooled standard deviation)
    CohensD,
}

impl fmt::Display for UndefinedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UndefinedQuantity::DeltaCt => "delta Ct",
            UndefinedQuantity::ControlBaseline => "control mean delta Ct",
            UndefinedQuantity::FoldChange => "fold change",
            UndefinedQuantity::TestStatistic => "test statistic",
            UndefinedQuantity::CohensD => "Cohen's d",
        };
        f.write_str(name)
    }
}

/// A non-fatal condition encountered during analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Ct value missing, <= 0 or above the cycle ceiling; excluded from averaging
    InvalidCt {
        sample_id: String,
        gene: String,
        condition: String,
        biological_replicate: String,
        technical_replicate: String,
        ct_value: Option<f64>,
    },

    /// Fewer than two valid observations in one arm of a comparison
    InsufficientData {
        gene: String,
        condition: String,
        n_control: usize,
        n_treatment: usize,
    },

    /// A derived value is undefined and was propagated as missing
    UndefinedValue {
        quantity: UndefinedQuantity,
        gene: String,
        condition: Option<String>,
        sample_id: Option<String>,
        reason: String,
    },

    /// Paired test requested but arm sizes differ; independent test used
    PairedFallback {
        gene: String,
        condition: String,
        n_control: usize,
        n_treatment: usize,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::InvalidCt {
                sample_id,
                gene,
                condition,
                biological_replicate,
                technical_replicate,
                ct_value,
            } => {
                let value = ct_value.map_or_else(|| "missing".to_string(), |v| v.to_string());
                write!(
                    f,
                    "Invalid Ct value ({}) for {} / {} / {} (bio rep {}, tech rep {})",
                    value, sample_id, gene, condition, biological_replicate, technical_replicate
                )
            }
            AnalysisWarning::InsufficientData {
                gene,
                condition,
                n_control,
                n_treatment,
            } => write!(
                f,
                "Insufficient data for {} {} comparison (control n={}, treatment n={})",
                gene, condition, n_control, n_treatment
            ),
            AnalysisWarning::UndefinedValue {
                quantity,
                gene,
                condition,
                sample_id,
                reason,
            } => {
                write!(f, "Undefined {} for {}", quantity, gene)?;
                if let Some(condition) = condition {
                    write!(f, " / {}", condition)?;
                }
                if let Some(sample_id) = sample_id {
                    write!(f, " / {}", sample_id)?;
                }
                write!(f, ": {}", reason)
            }
            AnalysisWarning::PairedFallback {
                gene,
                condition,
                n_control,
                n_treatment,
            } => write!(
                f,
                "Arms do not pair one-to-one by biological replicate: {} {} \
                 (control n={}, treatment n={}); independent test used instead",
                gene, condition, n_control, n_treatment
            ),
        }
    }
}

/// Ordered accumulator of warnings for one analysis stage or run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings {
    entries: Vec<AnalysisWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it through the log facade
    pub fn push(&mut self, warning: AnalysisWarning) {
        log::warn!("{}", warning);
        self.entries.push(warning);
    }

    /// Append warnings from another stage without logging them again
    pub fn extend(&mut self, other: Warnings) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnalysisWarning> {
        self.entries.iter()
    }

    /// Number of comparisons skipped for lack of data
    pub fn insufficient_data_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|w| matches!(w, AnalysisWarning::InsufficientData { .. }))
            .count()
    }

    /// Number of undefined values of the given kind
    pub fn undefined_count(&self, quantity: UndefinedQuantity) -> usize {
        self.entries
            .iter()
            .filter(|w| matches!(w, AnalysisWarning::UndefinedValue { quantity: q, .. } if *q == quantity))
            .count()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a AnalysisWarning;
    type IntoIter = std::slice::Iter<'a, AnalysisWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
