//! qpcr_stats command-line interface

use std::path::Path;

use clap::Parser;
use log::{info, LevelFilter};

use qpcr_stats::cli::{Cli, Commands};
use qpcr_stats::prelude::*;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // RUST_LOG, when set, refines the level chosen by --verbose
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            reference,
            control,
            alpha,
            confidence_level,
            pairing,
            correction,
            config,
            output,
            json,
        } => build_config(
            config.as_deref(),
            reference,
            control,
            alpha,
            confidence_level,
            pairing.as_deref(),
            &correction,
        )
        .and_then(|config| run_analysis(&input, &config, &output, json)),
        Commands::FoldChange {
            input,
            reference,
            control,
            output,
        } => run_fold_change(&input, &reference, &control, &output),
        Commands::Validate {
            input,
            reference,
            control,
        } => run_validate(&input, &reference, &control),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

/// Settings from the optional config file, overridden by command-line flags
fn build_config(
    config_path: Option<&str>,
    reference: Option<String>,
    control: Option<String>,
    alpha: Option<f64>,
    confidence_level: Option<f64>,
    pairing: Option<&str>,
    corrections: &[String],
) -> Result<AnalysisConfig> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading settings from: {}", path);
            AnalysisConfig::from_json_file(path)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(reference) = reference {
        config.reference_gene = reference;
    }
    if let Some(control) = control {
        config.control_condition = control;
    }
    if let Some(alpha) = alpha {
        config.alpha = alpha;
    }
    if let Some(level) = confidence_level {
        config.confidence_level = level;
    }
    if let Some(pairing) = pairing {
        config.pairing = pairing.parse()?;
    }
    for name in corrections {
        let method: CorrectionMethod = name.parse()?;
        if !config.corrections.contains(&method) {
            config.corrections.push(method);
        }
    }

    config.validate()?;
    Ok(config)
}

fn run_analysis(input: &str, config: &AnalysisConfig, output_dir: &str, json: bool) -> Result<()> {
    info!("Loading measurements from: {}", input);
    let measurements = read_measurements(input)?;

    info!(
        "Reference gene: {}, control condition: {}, alpha: {}, {} test",
        config.reference_gene, config.control_condition, config.alpha, config.pairing
    );
    let report = qpcr_stats::run_pipeline(&measurements, config)?;

    let out = Path::new(output_dir);
    std::fs::create_dir_all(out)?;

    info!("Writing results to: {}", out.display());
    write_delta_delta_ct(out.join("fold_changes.tsv"), &report.delta_delta_ct)?;
    write_test_results(out.join("statistics.tsv"), &report.results)?;
    write_confidence_intervals(out.join("confidence_intervals.tsv"), &report.confidence_intervals)?;
    write_expression_summary(out.join("expression_summary.tsv"), &report.expression_summary)?;
    if json {
        write_json_report(out.join("report.json"), &report)?;
    }

    println!();
    print!("{}", report.summary);
    if !report.warnings.is_empty() {
        println!("Warnings: {}", report.warnings.len());
    }

    info!("Done!");
    Ok(())
}

fn run_fold_change(input: &str, reference: &str, control: &str, output: &str) -> Result<()> {
    info!("Loading measurements from: {}", input);
    let measurements = read_measurements(input)?;

    let calculator = ExpressionCalculator::new(reference, control);
    let analysis = calculator.run(&measurements)?;

    info!("Writing fold changes to: {}", output);
    write_delta_delta_ct(output, &analysis.delta_delta_ct)?;

    if !analysis.warnings.is_empty() {
        println!("Warnings: {}", analysis.warnings.len());
    }

    info!("Done!");
    Ok(())
}

fn run_validate(input: &str, reference: &str, control: &str) -> Result<()> {
    info!("Loading measurements from: {}", input);
    let measurements = read_measurements(input)?;

    let report = validate_measurements(&measurements, reference, control);
    print!("{}", report);

    if !report.is_usable() {
        return Err(QpcrError::InvalidInput {
            reason: "data cannot be analyzed with the given reference gene and control condition"
                .to_string(),
        });
    }
    Ok(())
}
