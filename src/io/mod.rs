//! Input/Output for qPCR analysis

mod csv;
mod report;
mod results;

pub use self::csv::{
    read_measurements, write_confidence_intervals, write_delta_delta_ct,
    write_expression_summary, write_test_results,
};
pub use report::{write_json_report, QpcrReport};
pub use results::{
    ConfidenceInterval, CorrectedPValue, StatisticalReport, StatisticalSummary, TestResult,
};
