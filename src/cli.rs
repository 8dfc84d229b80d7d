use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "pump_report")]
#[command(about = "Classify pump test sheets and write a performance report")]
#[command(version)]
pub struct CliArgs {
    /// CSV exports, one per worksheet, or directories holding them
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Also write the report text to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a JSON summary of the analysis
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Write per-unit tandem match tables (CSV) into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Print each loaded table before the report
    #[arg(long)]
    pub show_raw: bool,

    /// Rows shown per table with --show-raw
    #[arg(long, default_value = "20")]
    pub raw_rows: usize,

    /// Customer name for the written report header
    #[arg(long)]
    pub customer: Option<String>,

    /// Order number for the written report header
    #[arg(long)]
    pub order: Option<String>,
}
