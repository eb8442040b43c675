//! DataLab - record analysis toolkit
//!
//! A CLI tool that loads JSON/CSV datasets, computes aggregate statistics
//! over their fields, and prints a formatted report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (bad data, missing file, invalid config)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod storage;

use anyhow::{Context, Result};
use cli::{Args, Command, FilesCommand, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use models::AnalysisResult;
use std::path::{Path, PathBuf};
use storage::file_ops;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first so its `verbose` setting can pick the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("DataLab v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    if let Err(e) = run(args, &config) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .datalab.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level(config.general.verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch the requested command.
fn run(args: Args, config: &Config) -> Result<()> {
    match args.command.unwrap_or(Command::Analyze {
        json: None,
        csv: None,
        paths: Vec::new(),
    }) {
        Command::Analyze { json, csv, paths } => run_analysis(config, json, csv, &paths),
        Command::Stats {
            path,
            field,
            counts,
        } => {
            let lines = if counts {
                let counts = analysis::count_path(&path, &field)
                    .with_context(|| format!("Counting {} in {} failed", field, path.display()))?;
                report::distribution_lines(&field, &counts)
            } else {
                let summary = analysis::summarize_path(&path, &field).with_context(|| {
                    format!("Summarizing {} in {} failed", field, path.display())
                })?;
                report::summary_lines(&summary, config)
            };
            print_lines(config, &lines);
            Ok(())
        }
        Command::Convert { input, output } => {
            let written = storage::convert(&input, &output)?;
            print_lines(
                config,
                &[format!("Wrote {} records to {}", written, output.display())],
            );
            Ok(())
        }
        Command::Config => {
            for line in config.describe() {
                println!("{}", line);
            }
            Ok(())
        }
        Command::Files(files) => run_files(config, files),
        Command::Backup { path, dir } => {
            let backup_dir = dir.unwrap_or_else(|| config.backup.backup_dir.clone());
            let backup = file_ops::create_backup(&path, &backup_dir)?;
            print_lines(config, &[format!("Backup created: {}", backup.display())]);
            Ok(())
        }
        Command::Cleanup { dir, keep } => {
            let backup_dir = dir.unwrap_or_else(|| config.backup.backup_dir.clone());
            let keep = keep.unwrap_or(config.backup.keep);
            let deleted = file_ops::cleanup_old_backups(&backup_dir, keep)?;
            let mut lines: Vec<String> = deleted
                .iter()
                .map(|path| format!("Deleted old backup: {}", path.display()))
                .collect();
            lines.push(format!("Removed {} backup(s)", deleted.len()));
            print_lines(config, &lines);
            Ok(())
        }
    }
}

/// Print lines to stdout behind the configured prefix.
fn print_lines(config: &Config, lines: &[String]) {
    for line in lines {
        println!("{}", report::prefixed(config, line));
    }
}

/// Analyze the requested datasets and print the report.
///
/// With no explicit selection, the default JSON and CSV datasets are
/// analyzed in that order.
fn run_analysis(
    config: &Config,
    json: Option<String>,
    csv: Option<String>,
    paths: &[PathBuf],
) -> Result<()> {
    let mut results: Vec<AnalysisResult> = Vec::new();
    let run_defaults = json.is_none() && csv.is_none() && paths.is_empty();

    if run_defaults || json.is_some() {
        let result = analysis::analyze_json_file(config, json.as_deref())
            .context("JSON analysis failed")?;
        results.push(result);
    }
    if run_defaults || csv.is_some() {
        let result = analysis::analyze_csv_file(config, csv.as_deref())
            .context("CSV analysis failed")?;
        results.push(result);
    }
    for path in paths {
        let result = analysis::analyze_path(path)
            .with_context(|| format!("Analysis of {} failed", path.display()))?;
        results.push(result);
    }

    match config.report.format {
        OutputFormat::Json => println!("{}", report::generate_json_report(&results)?),
        OutputFormat::Text => {
            let rule = "=".repeat(60);
            println!("{}", report::prefixed(config, "Welcome to DataLab - Data Analysis Tool"));
            println!();
            for result in &results {
                println!("{}", report::prefixed(config, &rule));
                print!("{}", report::render_text_report(result, config));
                println!();
            }
            println!("{}", report::prefixed(config, &rule));
            println!("{}", report::prefixed(config, "Analysis complete!"));
        }
    }

    Ok(())
}

/// Handle the `files` subcommands.
fn run_files(config: &Config, command: FilesCommand) -> Result<()> {
    let data_dir = config.data.data_dir.clone();

    match command {
        FilesCommand::List { dir } => {
            let dir = dir.unwrap_or(data_dir);
            let listing = file_ops::list_directory(&dir)?;
            println!("Files: {:?}", listing.files);
            println!("Directories: {:?}", listing.directories);
        }
        FilesCommand::Info { path } => match file_ops::file_info(&path)? {
            Some(info) => {
                println!("File: {}", info.name);
                println!("Size: {:.2} KB", info.size_kb());
                println!("Modified: {}", info.modified.format("%Y-%m-%d %H:%M:%S"));
                let kind = if info.is_file {
                    "file"
                } else if info.is_directory {
                    "directory"
                } else {
                    "other"
                };
                println!("Type: {}", kind);
                println!("Extension: {}", info.extension);
            }
            None => {
                warn!("Path does not exist: {}", path.display());
                println!("{} does not exist", path.display());
            }
        },
        FilesCommand::Find { pattern, dir } => {
            let dir = dir.unwrap_or(data_dir);
            let matches = file_ops::find_files(&pattern, &dir)?;
            if matches.is_empty() {
                println!("No files match {}", pattern);
            }
            for path in matches {
                println!("{}", path.display());
            }
        }
        FilesCommand::Copy {
            source,
            destination,
            no_backup,
        } => {
            let copied = file_ops::copy_file(&source, &destination, !no_backup)?;
            println!("Copied {} to {}", source.display(), copied.display());
        }
        FilesCommand::Size { dir } => {
            let dir = dir.unwrap_or(data_dir);
            let size = file_ops::directory_size(&dir);
            println!("{}: {:.2} KB", dir.display(), size as f64 / 1024.0);
        }
    }

    Ok(())
}

/// Where the effective configuration came from.
///
/// Loading happens before logging is set up, so the outcome is logged later.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    Fallback(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE)
            }
            ConfigOrigin::Builtin => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigOrigin::DefaultFile),
        Ok(None) => (Config::default(), ConfigOrigin::Builtin),
        Err(e) => (Config::default(), ConfigOrigin::Fallback(e)),
    })
}
