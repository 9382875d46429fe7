//! Two-sample t-tests of fold change, treatment versus control

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::effect_size::{cohens_d, EffectSize};
use super::pvalue::{t_critical, two_sided_pvalue_t};
use crate::data::DeltaDeltaCt;
use crate::diagnostics::{AnalysisWarning, UndefinedQuantity, Warnings};
use crate::error::QpcrError;
use crate::io::TestResult;
use crate::stats::{mean, pooled_std, sample_std, sample_variance};

/// Minimum observations per arm for a comparison
const MIN_GROUP_SIZE: usize = 2;

/// How observations in the two arms relate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPairing {
    #[default]
    Independent,
    Paired,
}

impl TestPairing {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestPairing::Independent => "independent",
            TestPairing::Paired => "paired",
        }
    }
}

impl fmt::Display for TestPairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestPairing {
    type Err = QpcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" | "unpaired" => Ok(TestPairing::Independent),
            "paired" => Ok(TestPairing::Paired),
            other => Err(QpcrError::InvalidInput {
                reason: format!("Unknown test pairing '{}'. Use: independent or paired", other),
            }),
        }
    }
}

/// Outcome of one t-test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTest {
    /// Infinite when the standard error is zero but the means differ,
    /// None when neither differs
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub df: usize,
    pub pairing: TestPairing,
}

/// Student's t-test with pooled variance (treatment minus control)
pub fn student_t_test(control: &[f64], treatment: &[f64]) -> TwoSampleTest {
    let nc = control.len();
    let nt = treatment.len();
    let df = (nc + nt).saturating_sub(2);

    let statistic = (|| {
        let sp = pooled_std(nc, sample_variance(control)?, nt, sample_variance(treatment)?)?;
        let se = sp * (1.0 / nc as f64 + 1.0 / nt as f64).sqrt();
        t_statistic(mean(treatment)? - mean(control)?, se)
    })();

    finish(statistic, df, TestPairing::Independent)
}

/// Paired t-test on per-pair differences; arms must already be aligned
pub fn paired_t_test(control: &[f64], treatment: &[f64]) -> TwoSampleTest {
    let diffs: Vec<f64> = treatment.iter().zip(control).map(|(t, c)| t - c).collect();
    let df = diffs.len().saturating_sub(1);

    let statistic = (|| {
        let se = sample_std(&diffs)? / (diffs.len() as f64).sqrt();
        t_statistic(mean(&diffs)?, se)
    })();

    finish(statistic, df, TestPairing::Paired)
}

/// Mean difference over its standard error
///
/// A zero standard error with a nonzero difference gives an infinite
/// statistic; with no difference the statistic is undefined.
fn t_statistic(difference: f64, se: f64) -> Option<f64> {
    if !difference.is_finite() || !se.is_finite() || se < 0.0 {
        return None;
    }
    if se > 0.0 {
        Some(difference / se)
    } else if difference == 0.0 {
        None
    } else {
        Some(f64::INFINITY.copysign(difference))
    }
}

fn finish(statistic: Option<f64>, df: usize, pairing: TestPairing) -> TwoSampleTest {
    let p_value = match statistic {
        Some(t) if t.is_infinite() => Some(0.0),
        Some(t) => Some(two_sided_pvalue_t(t, df as f64)).filter(|p| !p.is_nan()),
        None => None,
    };
    TwoSampleTest {
        statistic,
        p_value,
        df,
        pairing,
    }
}

/// Defined fold changes of one arm keyed by biological replicate, ordered by
/// replicate then sample
fn arm_values<'a>(rows: &[&'a DeltaDeltaCt]) -> Vec<(&'a str, f64)> {
    let mut defined: Vec<(&str, &str, f64)> = rows
        .iter()
        .filter_map(|r| {
            r.fold_change
                .map(|fc| (r.biological_replicate.as_str(), r.sample_id.as_str(), fc))
        })
        .collect();
    defined.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    defined.into_iter().map(|(bio, _, fc)| (bio, fc)).collect()
}

/// Join two arms on biological replicate
///
/// None unless both arms hold the same replicates, each exactly once.
fn join_on_replicate(
    control: &[(&str, f64)],
    treatment: &[(&str, f64)],
) -> Option<Vec<(f64, f64)>> {
    let unique = |arm: &[(&str, f64)]| arm.windows(2).all(|w| w[0].0 != w[1].0);
    if control.len() != treatment.len() || !unique(control) || !unique(treatment) {
        return None;
    }
    control
        .iter()
        .zip(treatment)
        .map(|(c, t)| (c.0 == t.0).then_some((c.1, t.1)))
        .collect()
}

fn first_appearance<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Compare every treatment condition against the control, per gene
///
/// Genes and treatment conditions keep first-appearance order. Comparisons
/// with fewer than two defined fold changes in either arm are skipped with an
/// InsufficientData warning. Raw p-values only; corrections are applied
/// separately.
pub fn test_each_gene(
    table: &[DeltaDeltaCt],
    control_condition: &str,
    alpha: f64,
    pairing: TestPairing,
) -> (Vec<TestResult>, Warnings) {
    let mut results = Vec::new();
    let mut warnings = Warnings::new();

    let genes = first_appearance(table.iter().map(|r| r.target_gene.as_str()));
    let treatments: Vec<&str> = first_appearance(table.iter().map(|r| r.condition.as_str()))
        .into_iter()
        .filter(|c| *c != control_condition)
        .collect();

    log::info!(
        "Testing {} genes across {} treatment conditions ({} test)",
        genes.len(),
        treatments.len(),
        pairing
    );

    for gene in &genes {
        let gene_rows: Vec<&DeltaDeltaCt> =
            table.iter().filter(|r| r.target_gene == *gene).collect();
        let control_rows: Vec<&DeltaDeltaCt> = gene_rows
            .iter()
            .copied()
            .filter(|r| r.condition == control_condition)
            .collect();
        let control = arm_values(&control_rows);

        for treatment_condition in &treatments {
            let treatment_rows: Vec<&DeltaDeltaCt> = gene_rows
                .iter()
                .copied()
                .filter(|r| r.condition == *treatment_condition)
                .collect();
            if treatment_rows.is_empty() {
                log::debug!("{} not measured under {}", gene, treatment_condition);
                continue;
            }
            let treatment = arm_values(&treatment_rows);

            if control.len() < MIN_GROUP_SIZE || treatment.len() < MIN_GROUP_SIZE {
                warnings.push(AnalysisWarning::InsufficientData {
                    gene: gene.to_string(),
                    condition: treatment_condition.to_string(),
                    n_control: control.len(),
                    n_treatment: treatment.len(),
                });
                continue;
            }

            let result = compare(
                gene,
                treatment_condition,
                control_condition,
                &control,
                &treatment,
                alpha,
                pairing,
                &mut warnings,
            );
            results.push(result);
        }
    }

    log::info!("Completed {} comparisons", results.len());
    (results, warnings)
}

#[allow(clippy::too_many_arguments)]
fn compare(
    gene: &str,
    treatment_condition: &str,
    control_condition: &str,
    control_arm: &[(&str, f64)],
    treatment_arm: &[(&str, f64)],
    alpha: f64,
    pairing: TestPairing,
    warnings: &mut Warnings,
) -> TestResult {
    let control: Vec<f64> = control_arm.iter().map(|&(_, fc)| fc).collect();
    let treatment: Vec<f64> = treatment_arm.iter().map(|&(_, fc)| fc).collect();
    let nc = control.len();
    let nt = treatment.len();

    // Both arms hold at least two values here, so these are defined
    let control_mean = mean(&control).unwrap_or(f64::NAN);
    let treatment_mean = mean(&treatment).unwrap_or(f64::NAN);
    let control_std = sample_std(&control).unwrap_or(f64::NAN);
    let treatment_std = sample_std(&treatment).unwrap_or(f64::NAN);
    let mean_difference = treatment_mean - control_mean;

    let test = match pairing {
        TestPairing::Paired => match join_on_replicate(control_arm, treatment_arm) {
            Some(pairs) => {
                let (c, t): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
                paired_t_test(&c, &t)
            }
            None => {
                warnings.push(AnalysisWarning::PairedFallback {
                    gene: gene.to_string(),
                    condition: treatment_condition.to_string(),
                    n_control: nc,
                    n_treatment: nt,
                });
                student_t_test(&control, &treatment)
            }
        },
        TestPairing::Independent => student_t_test(&control, &treatment),
    };

    if test.statistic.is_none() {
        warnings.push(AnalysisWarning::UndefinedValue {
            quantity: UndefinedQuantity::TestStatistic,
            gene: gene.to_string(),
            condition: Some(treatment_condition.to_string()),
            sample_id: None,
            reason: "zero standard error and no mean difference".to_string(),
        });
    }

    let d = cohens_d(&control, &treatment);
    if d.is_none() {
        warnings.push(AnalysisWarning::UndefinedValue {
            quantity: UndefinedQuantity::CohensD,
            gene: gene.to_string(),
            condition: Some(treatment_condition.to_string()),
            sample_id: None,
            reason: "zero pooled standard deviation".to_string(),
        });
    }

    // Interval on the mean difference from the unpooled standard error
    let degrees_freedom = nc + nt - 2;
    let se_diff = (control_std.powi(2) / nc as f64 + treatment_std.powi(2) / nt as f64).sqrt();
    let margin = if se_diff == 0.0 {
        0.0
    } else {
        t_critical(1.0 - alpha / 2.0, degrees_freedom as f64) * se_diff
    };

    TestResult {
        gene: gene.to_string(),
        condition: treatment_condition.to_string(),
        comparison: format!("{} vs {}", treatment_condition, control_condition),
        control_mean,
        control_std,
        control_n: nc,
        treatment_mean,
        treatment_std,
        treatment_n: nt,
        mean_difference,
        t_statistic: test.statistic,
        p_value: test.p_value,
        significant: test.p_value.map_or(false, |p| p < alpha),
        cohens_d: d,
        effect_size: d.map(EffectSize::from_cohens_d),
        ci_lower: mean_difference - margin,
        ci_upper: mean_difference + margin,
        degrees_freedom,
        pairing: test.pairing,
        alpha,
        corrections: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sample: &str, gene: &str, condition: &str, bio: &str, fc: Option<f64>) -> DeltaDeltaCt {
        let ddct = fc.map(|f| -f.log2());
        DeltaDeltaCt {
            sample_id: sample.to_string(),
            condition: condition.to_string(),
            biological_replicate: bio.to_string(),
            target_gene: gene.to_string(),
            delta_ct: 4.0,
            control_mean_delta_ct: ddct.map(|d| 4.0 - d),
            delta_delta_ct: ddct,
            fold_change: fc,
        }
    }

    fn table(gene: &str, control: &[f64], treatment: &[f64]) -> Vec<DeltaDeltaCt> {
        let mut rows = Vec::new();
        for (i, &fc) in control.iter().enumerate() {
            let bio = (i + 1).to_string();
            rows.push(row(&format!("C{}", i + 1), gene, "Control", &bio, Some(fc)));
        }
        for (i, &fc) in treatment.iter().enumerate() {
            let bio = (i + 1).to_string();
            rows.push(row(&format!("T{}", i + 1), gene, "LPS", &bio, Some(fc)));
        }
        rows
    }

    #[test]
    fn test_clear_induction_is_significant() {
        let rows = table("IL6", &[1.0, 1.2, 0.9], &[3.8, 4.2, 4.0]);
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        assert!(warnings.is_empty());
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.comparison, "LPS vs Control");
        assert_eq!(r.control_n, 3);
        assert_eq!(r.degrees_freedom, 4);
        assert!(r.p_value.unwrap() < 0.05);
        assert!(r.significant);
        assert!(r.cohens_d.unwrap() > 0.8);
        assert_eq!(r.effect_size, Some(EffectSize::Large));
        assert!(r.ci_lower < r.mean_difference && r.mean_difference < r.ci_upper);
        assert!(r.ci_lower > 0.0);
    }

    #[test]
    fn test_student_t_known_value() {
        // Equal variances of 1, difference 2, se = sqrt(2/3)
        let test = student_t_test(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]);
        let expected = 2.0 / (2.0f64 / 3.0).sqrt();
        assert!((test.statistic.unwrap() - expected).abs() < 1e-12);
        assert_eq!(test.df, 4);
        let p = test.p_value.unwrap();
        assert!(p > 0.05 && p < 0.1, "p = {}", p);
    }

    #[test]
    fn test_insufficient_data_skipped() {
        let rows = table("IL6", &[1.0, 1.1], &[2.0]);
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        assert!(results.is_empty());
        assert_eq!(warnings.insufficient_data_count(), 1);
    }

    #[test]
    fn test_undefined_fold_changes_not_counted() {
        let mut rows = table("IL6", &[1.0, 1.1], &[2.0, 2.2]);
        rows.push(row("T3", "IL6", "LPS", "3", None));
        let (results, _) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        assert_eq!(results[0].treatment_n, 2);
    }

    #[test]
    fn test_zero_variance_with_shift_is_infinite() {
        // Clean 8-fold induction with identical replicates
        let rows = table("IL6", &[1.0, 1.0], &[8.0, 8.0]);
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        let r = &results[0];
        assert_eq!(r.t_statistic, Some(f64::INFINITY));
        assert_eq!(r.p_value, Some(0.0));
        assert!(r.significant);
        assert_eq!(r.cohens_d, None);
        assert_eq!(r.ci_lower, r.ci_upper);
        assert_eq!(warnings.undefined_count(UndefinedQuantity::TestStatistic), 0);
        assert_eq!(warnings.undefined_count(UndefinedQuantity::CohensD), 1);

        let down = student_t_test(&[8.0, 8.0], &[1.0, 1.0]);
        assert_eq!(down.statistic, Some(f64::NEG_INFINITY));
        assert_eq!(down.p_value, Some(0.0));

        // Constant paired shift
        let paired = paired_t_test(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]);
        assert_eq!(paired.statistic, Some(f64::INFINITY));
        assert_eq!(paired.p_value, Some(0.0));
    }

    #[test]
    fn test_identical_arms_give_undefined_statistic() {
        let rows = table("IL6", &[2.0, 2.0], &[2.0, 2.0]);
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        let r = &results[0];
        assert_eq!(r.t_statistic, None);
        assert_eq!(r.p_value, None);
        assert!(!r.significant);
        assert_eq!(r.effect_size, None);
        assert_eq!(warnings.undefined_count(UndefinedQuantity::TestStatistic), 1);
        assert_eq!(warnings.undefined_count(UndefinedQuantity::CohensD), 1);
    }

    #[test]
    fn test_paired_uses_differences() {
        // Constant shift except one pair; paired df = n - 1
        let rows = table("IL6", &[1.0, 2.0, 3.0, 4.0], &[2.1, 3.0, 4.1, 5.0]);
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Paired);
        assert!(warnings.is_empty());
        assert_eq!(results[0].pairing, TestPairing::Paired);
        assert!(results[0].p_value.unwrap() < 0.001);
        // Independent test cannot see the pairing
        let (independent, _) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        assert!(independent[0].p_value.unwrap() > 0.05);
    }

    #[test]
    fn test_paired_falls_back_on_unequal_arms() {
        let rows = table("IL6", &[1.0, 1.2, 0.9], &[3.8, 4.2]);
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Paired);
        assert_eq!(results[0].pairing, TestPairing::Independent);
        assert!(matches!(
            warnings.iter().next(),
            Some(AnalysisWarning::PairedFallback { n_control: 3, n_treatment: 2, .. })
        ));
    }

    #[test]
    fn test_paired_matches_biological_replicates() {
        // Replicate 2 is listed first in both arms; pairs still line up by id
        let rows = vec![
            row("C2", "IL6", "Control", "2", Some(2.0)),
            row("C1", "IL6", "Control", "1", Some(1.0)),
            row("C3", "IL6", "Control", "3", Some(3.0)),
            row("T2", "IL6", "LPS", "2", Some(3.1)),
            row("T3", "IL6", "LPS", "3", Some(4.0)),
            row("T1", "IL6", "LPS", "1", Some(2.0)),
        ];
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Paired);
        assert!(warnings.is_empty());
        assert_eq!(results[0].pairing, TestPairing::Paired);
        let expected = paired_t_test(&[1.0, 2.0, 3.0], &[2.0, 3.1, 4.0]);
        assert_eq!(results[0].t_statistic, expected.statistic);
    }

    #[test]
    fn test_paired_falls_back_on_misaligned_replicates() {
        // Equal counts, but control has reps 1 and 3 while treatment has 1 and 2
        let rows = vec![
            row("C1", "IL6", "Control", "1", Some(1.0)),
            row("C2", "IL6", "Control", "2", None),
            row("C3", "IL6", "Control", "3", Some(5.0)),
            row("T1", "IL6", "LPS", "1", Some(2.0)),
            row("T2", "IL6", "LPS", "2", Some(3.0)),
            row("T3", "IL6", "LPS", "3", None),
        ];
        let (results, warnings) = test_each_gene(&rows, "Control", 0.05, TestPairing::Paired);
        let r = &results[0];
        assert_eq!(r.pairing, TestPairing::Independent);
        assert_eq!(r.t_statistic, student_t_test(&[1.0, 5.0], &[2.0, 3.0]).statistic);
        assert!(matches!(
            warnings.iter().next(),
            Some(AnalysisWarning::PairedFallback { n_control: 2, n_treatment: 2, .. })
        ));
    }

    #[test]
    fn test_join_requires_unique_replicates() {
        assert_eq!(
            join_on_replicate(&[("1", 1.0), ("2", 2.0)], &[("1", 1.5), ("2", 2.5)]),
            Some(vec![(1.0, 1.5), (2.0, 2.5)])
        );
        assert_eq!(join_on_replicate(&[("1", 1.0), ("1", 2.0)], &[("1", 1.5), ("2", 2.5)]), None);
        assert_eq!(join_on_replicate(&[("1", 1.0), ("2", 2.0)], &[("1", 1.5), ("3", 2.5)]), None);
    }

    #[test]
    fn test_first_appearance_order() {
        let mut rows = table("TNF", &[1.0, 1.1], &[2.0, 2.3]);
        rows.extend(table("IL6", &[1.0, 1.1], &[2.0, 2.3]));
        let (results, _) = test_each_gene(&rows, "Control", 0.05, TestPairing::Independent);
        let genes: Vec<&str> = results.iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["TNF", "IL6"]);
    }

    #[test]
    fn test_pairing_names() {
        assert_eq!("Paired".parse::<TestPairing>().unwrap(), TestPairing::Paired);
        assert_eq!(TestPairing::Independent.to_string(), "independent");
        assert!("welch".parse::<TestPairing>().is_err());
    }
}
