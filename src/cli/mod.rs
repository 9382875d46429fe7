//! Command-line interface for qpcr_stats

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qpcr_stats")]
#[command(version)]
#[command(about = "Relative qPCR quantification (delta-delta Ct) with significance testing")]
#[command(arg_required_else_help = true)]
#[command(after_long_help = "\
Examples:
  qpcr_stats analyze -i plate1.csv -o results/
  qpcr_stats analyze -i plate1.csv -r ACTB -c Vehicle --pairing paired --correction holm --json
  qpcr_stats validate -i plate1.csv")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis
    #[command(
        about = "Run the full analysis",
        long_about = "Run the full analysis\n\n\
            Averages technical replicates, normalizes each target gene to the reference\n\
            gene (delta Ct) and to the control condition (delta-delta Ct), then tests\n\
            every treatment against the control per gene. Bonferroni and Benjamini-Hochberg\n\
            corrections are always applied; Holm can be added with --correction.",
        after_long_help = "\
Examples:
  # Defaults: reference GAPDH, control condition Control, alpha 0.05
  qpcr_stats analyze -i plate1.csv -o results/

  # Different reference gene and control, paired by biological replicate
  qpcr_stats analyze -i plate1.csv -r ACTB -c Vehicle --pairing paired

  # Add Holm correction and write a JSON report
  qpcr_stats analyze -i plate1.csv --correction holm --json

  # Settings from a JSON file, alpha overridden on the command line
  qpcr_stats analyze -i plate1.csv --config analysis.json -a 0.01"
    )]
    Analyze {
        /// Path to measurements CSV/TSV file
        #[arg(short, long,
            long_help = "Path to the measurements file.\n\
                Columns: sample_id, gene, condition, biological_replicate, ct_value\n\
                and optionally technical_replicate. Header names are case-insensitive;\n\
                Sample_ID, Gene, Condition, Biological_Rep, Technical_Rep, Ct_Value\n\
                are accepted. CSV (comma) and TSV (tab) are auto-detected.")]
        input: String,

        /// Reference (housekeeping) gene [default: GAPDH]
        #[arg(short, long)]
        reference: Option<String>,

        /// Control condition [default: Control]
        #[arg(short, long)]
        control: Option<String>,

        /// Significance threshold [default: 0.05]
        #[arg(short, long)]
        alpha: Option<f64>,

        /// Confidence level for intervals [default: 0.95]
        #[arg(long)]
        confidence_level: Option<f64>,

        /// Test pairing [default: independent]
        #[arg(long,
            long_help = "How control and treatment observations relate.\n\
                independent: Student's t-test with pooled variance\n\
                paired:      paired t-test, pairs matched by biological replicate;\n\
                             falls back to independent when group sizes differ")]
        pairing: Option<String>,

        /// Additional correction method (repeatable)
        #[arg(long, value_name = "METHOD",
            long_help = "Additional multiple-comparison correction.\n\
                bonferroni and fdr_bh are always applied; holm may be added.\n\
                Can be specified multiple times.")]
        correction: Vec<String>,

        /// JSON file with analysis settings
        #[arg(long, value_name = "FILE",
            long_help = "JSON file with analysis settings (reference_gene, control_condition,\n\
                alpha, confidence_level, corrections, pairing). Command-line flags\n\
                override values from the file.")]
        config: Option<String>,

        /// Output directory [default: qpcr_results]
        #[arg(short, long, default_value = "qpcr_results")]
        output: String,

        /// Also write report.json
        #[arg(long)]
        json: bool,
    },

    /// Compute fold changes only
    #[command(
        long_about = "Compute delta Ct, delta-delta Ct and fold change without testing.",
        after_long_help = "\
Examples:
  qpcr_stats fold-change -i plate1.csv -o fold_changes.tsv
  qpcr_stats fold-change -i plate1.csv -r ACTB -c Vehicle"
    )]
    FoldChange {
        /// Path to measurements CSV/TSV file
        #[arg(short, long)]
        input: String,

        /// Reference (housekeeping) gene
        #[arg(short, long, default_value = "GAPDH")]
        reference: String,

        /// Control condition
        #[arg(short, long, default_value = "Control")]
        control: String,

        /// Output file path [default: fold_changes.tsv]
        #[arg(short, long, default_value = "fold_changes.tsv")]
        output: String,
    },

    /// Check a measurements file
    #[command(
        long_about = "Check a measurements file for schema problems, invalid Ct values,\n\
            and presence of the reference gene and control condition.",
        after_long_help = "\
Examples:
  qpcr_stats validate -i plate1.csv
  qpcr_stats validate -i plate1.csv -r ACTB -c Vehicle"
    )]
    Validate {
        /// Path to measurements CSV/TSV file
        #[arg(short, long)]
        input: String,

        /// Reference (housekeeping) gene
        #[arg(short, long, default_value = "GAPDH")]
        reference: String,

        /// Control condition
        #[arg(short, long, default_value = "Control")]
        control: String,
    },
}
