//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "routeros-blacklist")]
#[command(
    author,
    version,
    about = "Aggregate public IP blocklists into RouterOS address-list scripts"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (built-in sources are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download all sources and write the standard and light blacklist scripts
    Generate {
        /// Output directory for generated files (default: from config, ".")
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Minimum entries in the standard list (default: 1000)
        #[arg(long)]
        min_standard: Option<usize>,

        /// Minimum entries in the light list (default: 500)
        #[arg(long)]
        min_light: Option<usize>,

        /// Download and process sources without writing files
        #[arg(long)]
        dry_run: bool,

        /// Also write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// List configured sources and the lists they feed
    Sources,

    /// Show how raw lines would be normalized
    Normalize {
        /// Lines to normalize (quote lines containing spaces or tabs)
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Print the default configuration file
    Config,

    /// Show version
    Version,
}

impl Commands {
    /// Overrides carried by `generate`, if this is that command
    pub fn generate_options(&self) -> Option<GenerateOptions> {
        match self {
            Commands::Generate {
                output_dir,
                min_standard,
                min_light,
                dry_run,
                summary,
            } => Some(GenerateOptions {
                output_dir: output_dir.clone(),
                min_standard: *min_standard,
                min_light: *min_light,
                dry_run: *dry_run,
                summary: summary.clone(),
            }),
            _ => None,
        }
    }
}
