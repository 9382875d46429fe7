//! Complete analysis report and its JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::data::{DeltaCt, DeltaDeltaCt, ReplicateMean};
use crate::diagnostics::Warnings;
use crate::error::Result;
use crate::expression::{summarize_expression, ExpressionAnalysis, ExpressionSummary};

use super::results::{ConfidenceInterval, StatisticalReport, StatisticalSummary, TestResult};

/// Every table of one run, the settings that produced it, and all warnings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpcrReport {
    pub config: AnalysisConfig,
    pub replicate_means: Vec<ReplicateMean>,
    pub delta_ct: Vec<DeltaCt>,
    pub delta_delta_ct: Vec<DeltaDeltaCt>,
    pub expression_summary: Vec<ExpressionSummary>,
    pub results: Vec<TestResult>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
    pub summary: StatisticalSummary,
    /// Expression-stage warnings followed by significance-stage warnings
    pub warnings: Warnings,
}

impl QpcrReport {
    pub fn new(
        config: AnalysisConfig,
        expression: ExpressionAnalysis,
        statistics: StatisticalReport,
    ) -> Self {
        let expression_summary = summarize_expression(&expression.delta_delta_ct);
        let mut warnings = expression.warnings;
        warnings.extend(statistics.warnings);

        Self {
            config,
            replicate_means: expression.replicate_means,
            delta_ct: expression.delta_ct,
            delta_delta_ct: expression.delta_delta_ct,
            expression_summary,
            results: statistics.results,
            confidence_intervals: statistics.confidence_intervals,
            summary: statistics.summary,
            warnings,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn write_json_report<P: AsRef<Path>>(path: P, report: &QpcrReport) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
