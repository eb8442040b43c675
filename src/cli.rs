//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::SourceKind;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// DataLab - load JSON/CSV records, compute statistics, print a report
///
/// Without a command, analyzes the default JSON dataset and then the
/// default CSV dataset from the data directory.
///
/// Examples:
///   datalab
///   datalab --data-dir ./datasets --decimals 1
///   datalab analyze --csv staff.csv
///   datalab analyze exports/2024.json exports/2024.csv --format json
///   datalab files find "**/*.csv"
///   datalab backup data/people.csv
///   datalab cleanup --keep 3
///   datalab --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .datalab.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing the datasets
    #[arg(short, long, value_name = "DIR", env = "DATALAB_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Default number of decimal places in the report
    #[arg(long, value_name = "N", global = true)]
    pub decimals: Option<usize>,

    /// Report output format (text, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Prefix written before each report line
    #[arg(long, value_name = "TEXT", global = true)]
    pub log_prefix: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .datalab.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands. The default is a full analysis run.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Analyze datasets and print a report
    Analyze {
        /// JSON dataset filename inside the data directory
        #[arg(long, value_name = "FILE")]
        json: Option<String>,

        /// CSV dataset filename inside the data directory
        #[arg(long, value_name = "FILE")]
        csv: Option<String>,

        /// Explicit dataset paths; format is inferred from the extension
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Summarize one field of a dataset
    Stats {
        /// Dataset path; format is inferred from the extension
        path: PathBuf,

        /// Field to summarize
        field: String,

        /// Only count occurrences of each value (no numeric coercion)
        #[arg(long)]
        counts: bool,
    },

    /// Convert a dataset between JSON and CSV
    Convert {
        /// Input dataset (.json or .csv)
        input: PathBuf,

        /// Output dataset (.json or .csv)
        output: PathBuf,
    },

    /// Print the effective configuration
    Config,

    /// Inspect files
    #[command(subcommand)]
    Files(FilesCommand),

    /// Create a timestamped backup of a file
    Backup {
        /// File to back up
        path: PathBuf,

        /// Backup directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Delete old backups, keeping the most recent ones
    Cleanup {
        /// Backup directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Number of backups to keep
        #[arg(long, value_name = "COUNT")]
        keep: Option<usize>,
    },
}

/// File inspection subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FilesCommand {
    /// List files and directories (defaults to the data directory)
    List { dir: Option<PathBuf> },

    /// Show size, modification time, and type of a path
    Info { path: PathBuf },

    /// Find files matching a glob pattern such as "*.json" or "**/*.csv"
    Find {
        pattern: String,

        /// Directory to search (defaults to the data directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Total size of a directory tree (defaults to the data directory)
    Size { dir: Option<PathBuf> },

    /// Copy a file, backing up an existing destination first
    Copy {
        source: PathBuf,
        destination: PathBuf,

        /// Overwrite the destination without a backup
        #[arg(long)]
        no_backup: bool,
    },
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Prefixed text lines (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Some(Command::Analyze { paths, .. }) => {
                for path in paths {
                    if !path.exists() {
                        return Err(format!("Dataset does not exist: {}", path.display()));
                    }
                }
            }
            Some(Command::Convert { input, output }) => {
                for path in [input, output] {
                    if SourceKind::from_path(path).is_none() {
                        return Err(format!(
                            "Cannot infer format of {} (expected .json or .csv)",
                            path.display()
                        ));
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the configuration file's `verbose` setting;
    /// `--quiet` still wins over it. Reports go to stdout, so the default
    /// keeps diagnostics to warnings.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}
