//! qpcr_stats: relative qPCR quantification with significance testing
//!
//! Raw Ct values are reduced to fold changes by the delta-delta Ct method,
//! then every treatment condition is tested against the control per gene
//! with multiple-comparison correction, effect sizes and confidence intervals.
//!
//! # Example
//!
//! ```ignore
//! use qpcr_stats::prelude::*;
//!
//! // Load data
//! let measurements = read_measurements("plate1.csv")?;
//!
//! // Run analysis with default settings (GAPDH, Control, alpha 0.05)
//! let report = run_pipeline(&measurements, &AnalysisConfig::default())?;
//!
//! // Inspect results
//! println!("{}", report.summary);
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod io;
pub mod stats;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::data::{validate_measurements, DeltaCt, DeltaDeltaCt, Measurement, ReplicateMean};
    pub use crate::diagnostics::{AnalysisWarning, UndefinedQuantity, Warnings};
    pub use crate::error::{QpcrError, Result};
    pub use crate::expression::{summarize_expression, ExpressionAnalysis, ExpressionCalculator};
    pub use crate::io::{
        read_measurements, write_confidence_intervals, write_delta_delta_ct,
        write_expression_summary, write_json_report, write_test_results, QpcrReport,
        StatisticalReport, TestResult,
    };
    pub use crate::testing::{
        correct, run_full_analysis, run_full_analysis_with_params, CorrectionMethod,
        SignificanceParams, TestPairing,
    };
}

use prelude::*;

/// Run the complete pipeline: expression calculation, then significance testing
pub fn run_pipeline(measurements: &[Measurement], config: &AnalysisConfig) -> Result<QpcrReport> {
    config.validate()?;

    // Step 1: Fold changes relative to the reference gene and control condition
    let calculator = ExpressionCalculator::new(&config.reference_gene, &config.control_condition);
    let expression = calculator.run(measurements)?;

    // Step 2: Tests, corrections and confidence intervals
    let statistics = run_full_analysis_with_params(
        &expression.delta_delta_ct,
        &config.control_condition,
        &config.significance_params(),
    );

    Ok(QpcrReport::new(
        config.clone().with_applied_corrections(),
        expression,
        statistics,
    ))
}
