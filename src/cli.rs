//! CLI interface for the skill gap analyzer

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skillgap")]
#[command(about = "Skill gap analysis between resumes and job descriptions")]
#[command(
    long_about = "Extract taxonomy-registered skills from a resume and a job description, then report which required skills are matched, partially evidenced, or missing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the skill gap between a resume and a job description
    Analyze {
        /// Path to plain-text resume file (TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to plain-text job description file (TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Path to the taxonomy catalog (JSON, TOML)
        #[arg(short, long)]
        taxonomy: PathBuf,

        /// Confidence cutoff for counting a required skill as matched
        #[arg(long)]
        threshold: Option<f32>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Include evidence excerpts in console output
        #[arg(short, long)]
        detailed: bool,
    },

    /// Taxonomy catalog commands
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

#[derive(Subcommand)]
pub enum TaxonomyAction {
    /// Validate a catalog file
    Validate {
        /// Path to the taxonomy catalog
        taxonomy: PathBuf,
    },

    /// Show catalog statistics
    Info {
        /// Path to the taxonomy catalog
        taxonomy: PathBuf,
    },

    /// Look up a phrase against the catalog
    Lookup {
        /// Path to the taxonomy catalog
        taxonomy: PathBuf,

        /// Phrase to look up
        phrase: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "reconcile.match_threshold")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    format.parse()
}

/// Validate file extension
pub fn validate_file_extension(path: &PathBuf, allowed_extensions: &[&str]) -> Result<(), String> {
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
