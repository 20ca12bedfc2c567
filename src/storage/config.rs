//! Configuration handling for Blockscape
//!
//! Configuration is read from `blockscape.toml` in the watched root (project)
//! or, when that is absent, from `~/.config/blockscape/config.toml` (global).
//! Command-line flags override whatever is loaded.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "blockscape.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// File format written next to each source document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CompanionFormat {
    /// Raw JSON in `<name>.bs`
    #[default]
    Bs,
    /// JSON embedded in `<name>-bs.md`
    Md,
}

impl CompanionFormat {
    pub fn as_str(&self) -> &str {
        match self {
            CompanionFormat::Bs => "bs",
            CompanionFormat::Md => "md",
        }
    }
}

/// Configuration for the directory watcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Ignore markdown files smaller than this many bytes
    pub min_bytes: u64,

    /// Ignore markdown files last modified more than this many days ago
    pub max_age_days: Option<f64>,

    /// Debounce delay for filesystem events in milliseconds
    pub debounce_ms: u64,

    /// Companion file format
    pub output_format: CompanionFormat,

    /// Markdown template with a `{json}` placeholder (md format only)
    pub md_template: Option<PathBuf>,

    /// Append watcher activity to this file
    pub log_file: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            min_bytes: 5000,
            max_age_days: None,
            debounce_ms: 1000,
            output_format: CompanionFormat::Bs,
            md_template: None,
            log_file: None,
        }
    }
}

impl WatchConfig {
    /// Checks value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(days) = self.max_age_days {
            if days.is_nan() || days < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "max_age_days must be >= 0, got {}",
                    days
                )));
            }
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Default generation flags
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GenerateConfig {
    /// Emit a Current/Target pair
    pub series: bool,

    /// Annotate items with evolution stages
    pub stage_model: bool,
}

/// Combined configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub watch: WatchConfig,
    pub generate: GenerateConfig,
}

impl Config {
    /// Loads configuration for a root directory
    pub fn load(root: &Path) -> Result<Self> {
        let project_path = root.join(PROJECT_CONFIG_FILE);
        if project_path.is_file() {
            return Self::load_file(&project_path);
        }

        match Self::global_config_dir() {
            Some(dir) if dir.join("config.toml").is_file() => {
                Self::load_file(&dir.join("config.toml"))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.watch.validate()?;
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "blockscape", "blockscape")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.watch.min_bytes, 5000);
        assert_eq!(config.watch.output_format, CompanionFormat::Bs);
        assert!(config.watch.max_age_days.is_none());
        assert!(!config.generate.series);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[watch]
min_bytes = 10
output_format = "md"
max_age_days = 2.5

[generate]
stage_model = true
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.watch.min_bytes, 10);
        assert_eq!(config.watch.output_format, CompanionFormat::Md);
        assert_eq!(config.watch.max_age_days, Some(2.5));
        assert_eq!(config.watch.debounce_ms, 1000);
        assert!(config.generate.stage_model);
        assert!(!config.generate.series);
    }

    #[test]
    fn project_file_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[watch]\nmin_bytes = 1\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.watch.min_bytes, 1);
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&path, "[watch]\nmax_age_days = -1.0\n").unwrap();
        assert!(Config::load_file(&path).is_err());

        fs::write(&path, "[watch]\nmin_bytes = \"lots\"\n").unwrap();
        let err = Config::load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn format_names() {
        assert_eq!(CompanionFormat::Bs.as_str(), "bs");
        assert_eq!(CompanionFormat::Md.as_str(), "md");
    }
}
