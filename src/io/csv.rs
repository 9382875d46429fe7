//! CSV reading of qPCR measurements and tab-separated writing of result tables

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::{DeltaDeltaCt, Measurement};
use crate::error::{QpcrError, Result};
use crate::expression::ExpressionSummary;
use crate::testing::CorrectionMethod;

use super::results::{ConfidenceInterval, TestResult};

/// Canonical column names, required ones first
const SAMPLE_ID: &str = "sample_id";
const GENE: &str = "gene";
const CONDITION: &str = "condition";
const BIOLOGICAL_REPLICATE: &str = "biological_replicate";
const TECHNICAL_REPLICATE: &str = "technical_replicate";
const CT_VALUE: &str = "ct_value";

const REQUIRED_COLUMNS: [&str; 5] = [SAMPLE_ID, GENE, CONDITION, BIOLOGICAL_REPLICATE, CT_VALUE];

/// Cell spellings instruments use for a reaction without a Ct
const MISSING_CT: [&str; 5] = ["", "na", "nan", "undetermined", "-"];

/// Map a header cell onto a canonical column name
fn canonical_column(header: &str) -> Option<&'static str> {
    let name = header.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    match name.as_str() {
        "sample_id" | "sample" => Some(SAMPLE_ID),
        "gene" | "target" | "gene_name" => Some(GENE),
        "condition" | "treatment" | "group" => Some(CONDITION),
        "biological_replicate" | "biological_rep" | "bio_rep" => Some(BIOLOGICAL_REPLICATE),
        "technical_replicate" | "technical_rep" | "tech_rep" => Some(TECHNICAL_REPLICATE),
        "ct_value" | "ct" | "cq" => Some(CT_VALUE),
        _ => None,
    }
}

fn parse_ct(raw: &str, line: usize) -> Result<f64> {
    let value = raw.trim();
    if MISSING_CT.contains(&value.to_ascii_lowercase().as_str()) {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(|_| QpcrError::InvalidValue {
        line,
        column: CT_VALUE.to_string(),
        value: value.to_string(),
    })
}

/// Read raw qPCR measurements from a CSV or TSV file
///
/// The delimiter is detected from the header line. Columns are matched by
/// name, case-insensitively; all missing required columns are reported
/// together as a schema error.
pub fn read_measurements<P: AsRef<Path>>(path: P) -> Result<Vec<Measurement>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let header_line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| QpcrError::EmptyData {
            reason: format!("{} is empty", path.display()),
        })?;
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut columns: HashMap<&'static str, usize> = HashMap::new();
    for (i, header) in reader.headers()?.iter().enumerate() {
        if let Some(name) = canonical_column(header) {
            columns.entry(name).or_insert(i);
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(QpcrError::Schema { missing });
    }

    let field = |record: &csv::StringRecord, name: &str| -> String {
        columns
            .get(name)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
            .to_string()
    };

    let mut measurements = Vec::new();
    let mut tech_counters: HashMap<(String, String, String, String), usize> = HashMap::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);

        let sample_id = field(&record, SAMPLE_ID);
        let gene = field(&record, GENE);
        let condition = field(&record, CONDITION);
        let biological_replicate = field(&record, BIOLOGICAL_REPLICATE);
        let ct_value = parse_ct(&field(&record, CT_VALUE), line)?;

        let counter = tech_counters
            .entry((
                sample_id.clone(),
                gene.clone(),
                condition.clone(),
                biological_replicate.clone(),
            ))
            .or_insert(0);
        *counter += 1;

        let technical_replicate = match field(&record, TECHNICAL_REPLICATE) {
            t if t.is_empty() => counter.to_string(),
            t => t,
        };

        measurements.push(Measurement {
            sample_id,
            gene,
            condition,
            biological_replicate,
            technical_replicate,
            ct_value,
        });
    }

    if measurements.is_empty() {
        return Err(QpcrError::EmptyData {
            reason: format!("No measurements found in {}", path.display()),
        });
    }

    log::info!(
        "Loaded {} measurements from {}",
        measurements.len(),
        path.display()
    );

    Ok(measurements)
}

fn na(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.6}", v),
        _ => "NA".to_string(),
    }
}

fn na_sci(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.6e}", v),
        _ => "NA".to_string(),
    }
}

/// Write the delta-delta Ct and fold-change table
pub fn write_delta_delta_ct<P: AsRef<Path>>(path: P, rows: &[DeltaDeltaCt]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "sample_id\tcondition\tbiological_replicate\ttarget_gene\tdelta_ct\tcontrol_mean_delta_ct\tdelta_delta_ct\tfold_change")?;

    for row in rows {
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{:.6}\t{}\t{}\t{}",
            row.sample_id,
            row.condition,
            row.biological_replicate,
            row.target_gene,
            row.delta_ct,
            na(row.control_mean_delta_ct),
            na(row.delta_delta_ct),
            na(row.fold_change),
        )?;
    }

    file.flush()?;
    Ok(())
}

/// Write test results, one corrected p-value and flag pair per applied method
pub fn write_test_results<P: AsRef<Path>>(path: P, results: &[TestResult]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    // Columns for every method applied to any row, in first-seen order
    let mut methods: Vec<CorrectionMethod> = Vec::new();
    for result in results {
        for c in &result.corrections {
            if !methods.contains(&c.method) {
                methods.push(c.method);
            }
        }
    }

    write!(file, "gene\tcondition\tcomparison\tcontrol_mean\tcontrol_std\tcontrol_n\ttreatment_mean\ttreatment_std\ttreatment_n\tmean_difference\tt_statistic\tp_value\tsignificant\tcohens_d\teffect_size\tci_lower\tci_upper\tdegrees_freedom\tpairing\talpha")?;
    for method in &methods {
        write!(file, "\tp_{}\tsignificant_{}", method, method)?;
    }
    writeln!(file)?;

    for r in results {
        write!(
            file,
            "{}\t{}\t{}\t{:.6}\t{:.6}\t{}\t{:.6}\t{:.6}\t{}\t{:.6}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{:.6}\t{}\t{}\t{}",
            r.gene,
            r.condition,
            r.comparison,
            r.control_mean,
            r.control_std,
            r.control_n,
            r.treatment_mean,
            r.treatment_std,
            r.treatment_n,
            r.mean_difference,
            na(r.t_statistic),
            na_sci(r.p_value),
            r.significant,
            na(r.cohens_d),
            r.effect_size.map_or_else(|| "NA".to_string(), |e| e.to_string()),
            r.ci_lower,
            r.ci_upper,
            r.degrees_freedom,
            r.pairing,
            r.alpha,
        )?;
        for method in &methods {
            match r.corrected(*method) {
                Some(c) => write!(file, "\t{}\t{}", na_sci(c.p_value), c.significant)?,
                None => write!(file, "\tNA\tNA")?,
            }
        }
        writeln!(file)?;
    }

    file.flush()?;
    Ok(())
}

/// Write per-group confidence intervals of the mean fold change
pub fn write_confidence_intervals<P: AsRef<Path>>(
    path: P,
    intervals: &[ConfidenceInterval],
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "gene\tcondition\tmean\tstd\tn\tse\tci_lower\tci_upper\tci_width\tconfidence_level")?;

    for ci in intervals {
        writeln!(
            file,
            "{}\t{}\t{:.6}\t{:.6}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{}",
            ci.gene,
            ci.condition,
            ci.mean,
            ci.std,
            ci.n,
            ci.se,
            ci.ci_lower,
            ci.ci_upper,
            ci.ci_width,
            ci.confidence_level,
        )?;
    }

    file.flush()?;
    Ok(())
}

/// Write per-group descriptive statistics of expression values
pub fn write_expression_summary<P: AsRef<Path>>(
    path: P,
    summary: &[ExpressionSummary],
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "gene\tcondition\tn\tfold_change_mean\tfold_change_std\tdelta_ct_mean\tdelta_ct_std\tdelta_delta_ct_mean\tdelta_delta_ct_std")?;

    for s in summary {
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.gene,
            s.condition,
            s.n,
            na(s.fold_change_mean),
            na(s.fold_change_std),
            na(s.delta_ct_mean),
            na(s.delta_ct_std),
            na(s.delta_delta_ct_mean),
            na(s.delta_delta_ct_std),
        )?;
    }

    file.flush()?;
    Ok(())
}
