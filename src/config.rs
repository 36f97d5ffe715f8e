//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.decline.toml` files.

use crate::analysis::DEFAULT_MIN_CONSECUTIVE_DROPS;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".decline.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input discovery settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory receiving the exported files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "decline_output".to_string()
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Extensions picked up when a directory is given.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Descend into sub-directories.
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Files larger than this many bytes are skipped during directory scans.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            recursive: true,
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["txt", "csv"].into_iter().map(String::from).collect()
}

fn default_max_file_size() -> u64 {
    256 * 1024 * 1024 // 256MB
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Consecutive year-over-year drops needed for a sustained decline.
    #[serde(default = "default_min_consecutive_drops")]
    pub min_consecutive_drops: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_consecutive_drops: default_min_consecutive_drops(),
        }
    }
}

fn default_min_consecutive_drops() -> usize {
    DEFAULT_MIN_CONSECUTIVE_DROPS
}

/// Which artifacts get written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-delimited text only
    Csv,
    /// XLSX workbook only
    Xlsx,
    /// Both (default)
    #[default]
    Both,
}

impl ExportFormat {
    pub fn includes_csv(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    pub fn includes_xlsx(&self) -> bool {
        matches!(self, ExportFormat::Xlsx | ExportFormat::Both)
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Artifacts to write.
    #[serde(default)]
    pub format: ExportFormat,

    /// Append the run date to exported file names.
    #[serde(default = "default_true")]
    pub timestamp_filenames: bool,

    /// Rows shown per table with --preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Both,
            timestamp_filenames: true,
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_preview_rows() -> usize {
    20
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Reject settings the analysis cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.min_consecutive_drops == 0 {
            bail!("analysis.min_consecutive_drops must be at least 1");
        }
        if self.input.extensions.is_empty() {
            bail!("input.extensions must list at least one extension");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.display().to_string();
        }

        if let Some(format) = args.format {
            self.export.format = format;
        }

        if let Some(min_drops) = args.min_drops {
            self.analysis.min_consecutive_drops = min_drops;
        }

        if args.no_timestamp {
            self.export.timestamp_filenames = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
