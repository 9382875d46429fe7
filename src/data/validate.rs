//! Pre-analysis quality checks on raw measurements

use std::fmt;

use serde::Serialize;

use super::measurement::{Measurement, CT_CEILING};

/// Outcome of checking a measurement table before analysis
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub n_measurements: usize,
    pub n_invalid_ct: usize,
    pub n_samples: usize,
    pub n_genes: usize,
    pub reference_gene_present: bool,
    pub control_condition_present: bool,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when the data can be analyzed against the requested reference and control
    pub fn is_usable(&self) -> bool {
        self.n_measurements > 0 && self.reference_gene_present && self.control_condition_present
    }
}

/// Check measurements for invalid Ct values and presence of the reference
/// gene and control condition
pub fn validate_measurements(
    measurements: &[Measurement],
    reference_gene: &str,
    control_condition: &str,
) -> ValidationReport {
    let n_invalid_ct = measurements.iter().filter(|m| !m.has_valid_ct()).count();

    let mut samples: Vec<&str> = measurements.iter().map(|m| m.sample_id.as_str()).collect();
    samples.sort_unstable();
    samples.dedup();
    let mut genes: Vec<&str> = measurements.iter().map(|m| m.gene.as_str()).collect();
    genes.sort_unstable();
    genes.dedup();

    let reference_gene_present = measurements.iter().any(|m| m.gene == reference_gene);
    let control_condition_present = measurements.iter().any(|m| m.condition == control_condition);

    let mut warnings = Vec::new();
    if measurements.is_empty() {
        warnings.push("No measurements found".to_string());
    }
    if !reference_gene_present {
        warnings.push(format!("Reference gene '{}' not found in data", reference_gene));
    }
    if !control_condition_present {
        warnings.push(format!(
            "Control condition '{}' not found in data",
            control_condition
        ));
    }
    if n_invalid_ct > 0 {
        warnings.push(format!(
            "Found {} invalid Ct values (missing, <= 0, or > {})",
            n_invalid_ct, CT_CEILING
        ));
    }

    ValidationReport {
        n_measurements: measurements.len(),
        n_invalid_ct,
        n_samples: samples.len(),
        n_genes: genes.len(),
        reference_gene_present,
        control_condition_present,
        warnings,
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qPCR Data Validation")?;
        writeln!(f, "====================")?;
        writeln!(f, "Measurements: {}", self.n_measurements)?;
        writeln!(f, "Samples: {}", self.n_samples)?;
        writeln!(f, "Genes: {}", self.n_genes)?;
        writeln!(f, "Invalid Ct values: {}", self.n_invalid_ct)?;
        if self.warnings.is_empty() {
            writeln!(f, "Status: passed")?;
        } else {
            writeln!(f, "Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {}", warning)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_flags_invalid_ct() {
        let data = vec![
            Measurement::new("S1", "GAPDH", "Control", "1", "1", 18.0),
            Measurement::new("S1", "IL6", "Control", "1", "1", f64::NAN),
            Measurement::new("S1", "IL6", "Control", "1", "2", 45.0),
            Measurement::new("S2", "IL6", "LPS", "1", "1", 0.0),
        ];
        let report = validate_measurements(&data, "GAPDH", "Control");
        assert_eq!(report.n_measurements, 4);
        assert_eq!(report.n_invalid_ct, 3);
        assert_eq!(report.n_samples, 2);
        assert_eq!(report.n_genes, 2);
        assert!(report.is_usable());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_validation_missing_reference_and_control() {
        let data = vec![Measurement::new("S1", "IL6", "LPS", "1", "1", 22.0)];
        let report = validate_measurements(&data, "GAPDH", "Control");
        assert!(!report.reference_gene_present);
        assert!(!report.control_condition_present);
        assert!(!report.is_usable());
        assert_eq!(report.warnings.len(), 2);
    }
}
