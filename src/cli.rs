//! CLI interface for the match scorer

use crate::config::OutputFormat;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "match-scorer")]
#[command(about = "Explainable resume and job match scoring")]
#[command(long_about = "Score resumes against jobs in both directions, explain the result factor by factor, and plan how to close the skill gaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skill taxonomy file (JSON or TOML) replacing the built-in one
    #[arg(short, long, global = true)]
    pub taxonomy: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against one job
    Match {
        /// Path to the resume record (JSON or TOML)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to the job record (JSON or TOML)
        #[arg(short, long)]
        job: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Rank jobs for one resume
    RankJobs {
        /// Path to the resume record
        #[arg(short, long)]
        resume: PathBuf,

        /// Job file or directory of job files
        #[arg(short, long)]
        jobs: PathBuf,

        /// Number of results to keep
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Rank candidates for one job
    RankCandidates {
        /// Path to the job record
        #[arg(short, long)]
        job: PathBuf,

        /// Resume file or directory of resume files
        #[arg(short, long)]
        resumes: PathBuf,

        /// Number of results to keep
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Inspect the skill taxonomy
    Taxonomy {
        #[command(subcommand)]
        action: TaxonomyAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Options shared by every scoring command.
#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Output format: console, json, markdown
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output detailed analysis
    #[arg(short, long)]
    pub detailed: bool,

    /// Save output to file
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD) for elapsed-time factors; defaults to today
    #[arg(long, value_parser = parse_reference_date)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum TaxonomyAction {
    /// List the skills of the active taxonomy
    Show {
        /// Only show skills whose id or name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Check a taxonomy for errors and prerequisite cycles
    Validate {
        /// Taxonomy file to check; defaults to --taxonomy, then the built-in one
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_reference_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {} (expected YYYY-MM-DD)", value, e))
}

/// Validate file extension. Directories pass, their files are filtered on load.
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    if path.is_dir() {
        return Ok(());
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
