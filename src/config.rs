//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.datalab.toml` files. The resulting [`Config`] is built once at startup
//! and passed by reference to everything that needs it.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".datalab.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Backup settings.
    #[serde(default)]
    pub backup: BackupConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Prefix written before every report line.
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_prefix: default_log_prefix(),
            verbose: false,
        }
    }
}

fn default_log_prefix() -> String {
    "[DataLab]".to_string()
}

/// Where datasets live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the dataset files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Default JSON dataset filename.
    #[serde(default = "default_json_file")]
    pub json_file: String,

    /// Default CSV dataset filename.
    #[serde(default = "default_csv_file")]
    pub csv_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            json_file: default_json_file(),
            csv_file: default_csv_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_json_file() -> String {
    "data.json".to_string()
}

fn default_csv_file() -> String {
    "people.csv".to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default number of digits after the decimal point.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,

    /// Suffix appended to salary figures.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Output format of the analysis report.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            currency: default_currency(),
            format: OutputFormat::default(),
        }
    }
}

fn default_decimal_places() -> usize {
    2
}

fn default_currency() -> String {
    "SEK".to_string()
}

/// Backup housekeeping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory that receives timestamped backups.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Number of most recent backups kept by cleanup.
    #[serde(default = "default_keep")]
    pub keep: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            keep: default_keep(),
        }
    }
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_keep() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.datalab.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.data.data_dir = data_dir.clone();
        }
        if let Some(decimals) = args.decimals {
            self.report.decimal_places = decimals;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref prefix) = args.log_prefix {
            self.general.log_prefix = prefix.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Full path of a dataset file inside the data directory.
    pub fn data_path(&self, filename: &str) -> PathBuf {
        self.data.data_dir.join(filename)
    }

    /// Human-readable summary of the effective configuration.
    pub fn describe(&self) -> Vec<String> {
        let rule = "=".repeat(60);
        vec![
            rule.clone(),
            "DataLab Configuration".to_string(),
            rule.clone(),
            format!("Data directory:     {}", self.data.data_dir.display()),
            format!("Backup directory:   {}", self.backup.backup_dir.display()),
            String::new(),
            "Default files:".to_string(),
            format!("  JSON: {}", self.data_path(&self.data.json_file).display()),
            format!("  CSV:  {}", self.data_path(&self.data.csv_file).display()),
            String::new(),
            "Settings:".to_string(),
            format!("  Log prefix:       {}", self.general.log_prefix),
            format!("  Decimal places:   {}", self.report.decimal_places),
            format!("  Currency:         {}", self.report.currency),
            format!("  Report format:    {}", self.report.format),
            format!("  Backups kept:     {}", self.backup.keep),
            rule,
        ]
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_prefix, "[DataLab]");
        assert_eq!(config.report.decimal_places, 2);
        assert_eq!(config.data.json_file, "data.json");
        assert_eq!(config.data.csv_file, "people.csv");
        assert_eq!(config.backup.keep, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
log_prefix = ">>"

[data]
data_dir = "/srv/datasets"
csv_file = "staff.csv"

[report]
decimal_places = 3
currency = "EUR"
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.log_prefix, ">>");
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/datasets"));
        assert_eq!(config.data.csv_file, "staff.csv");
        assert_eq!(config.data.json_file, "data.json");
        assert_eq!(config.report.decimal_places, 3);
        assert_eq!(config.report.currency, "EUR");
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.backup, BackupConfig::default());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("[backup]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_verbose_setting_raises_log_level() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[general]\nverbose = true\n",
        )
        .unwrap();

        let mut config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        let args = make_args();
        config.merge_with_args(&args);
        assert!(config.general.verbose);
        assert_eq!(
            args.log_level(config.general.verbose),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        config.merge_with_args(&args);
        assert_eq!(config, Config::default());

        args.data_dir = Some(PathBuf::from("elsewhere"));
        args.decimals = Some(0);
        args.format = Some(OutputFormat::Json);
        args.verbose = true;
        config.merge_with_args(&args);
        assert_eq!(config.data.data_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.report.decimal_places, 0);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(config.general.verbose);
    }

    #[test]
    fn test_data_path_and_load_from_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(Config::load_from_dir(dir.path()).unwrap(), None);

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[data]\ndata_dir = \"sets\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.data_path("a.csv"), PathBuf::from("sets").join("a.csv"));

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[data\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_describe() {
        let lines = Config::default().describe();
        assert!(lines.iter().any(|l| l.contains("Log prefix:       [DataLab]")));
        assert!(lines.iter().any(|l| l.contains("Decimal places:   2")));
    }
}
