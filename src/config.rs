//! Configuration management for orgcluster
//!
//! Configuration is read from `./config/orgcluster.toml` (or a path given on
//! the command line). Every section is optional; missing values fall back to
//! the same defaults shipped in the config template.

use crate::alias_table::AliasTable;
use crate::extractor::{CompanyExtractor, ExtractionRule};
use crate::similarity::{MatchThresholds, DEFAULT_CONTAINMENT_THRESHOLD, DEFAULT_JACCARD_THRESHOLD};
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/orgcluster.toml";

/// Default configuration file content, written by `--init`
pub const DEFAULT_CONFIG: &str = include_str!("../config/orgcluster.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Configuration file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid regex pattern '{pattern_name}': {error}\n  Pattern: {pattern}")]
    InvalidRegex {
        pattern_name: String,
        pattern: String,
        error: String,
    },

    #[error("Extraction rule '{rule}' uses capture group {group} but the pattern has {available}")]
    InvalidCaptureGroup {
        rule: String,
        group: usize,
        available: usize,
    },

    #[error("Threshold '{field}' must be between 0.0 and 1.0, got {value}")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Failed to load alias dictionary {path}: {error}")]
    InvalidAliasFile { path: PathBuf, error: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub aliases: AliasesConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Similarity thresholds used by the cluster builder
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Minimum shorter/longer length ratio when one name contains the other
    #[serde(default = "default_containment_threshold")]
    pub containment_threshold: f64,
    /// Jaccard score must be strictly above this value
    #[serde(default = "default_jaccard_threshold")]
    pub jaccard_threshold: f64,
}

fn default_containment_threshold() -> f64 {
    DEFAULT_CONTAINMENT_THRESHOLD
}

fn default_jaccard_threshold() -> f64 {
    DEFAULT_JACCARD_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            containment_threshold: default_containment_threshold(),
            jaccard_threshold: default_jaccard_threshold(),
        }
    }
}

impl MatchingConfig {
    pub fn thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            containment: self.containment_threshold,
            jaccard: self.jaccard_threshold,
        }
    }
}

/// Title extraction settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Extracted names shorter than this many characters are discarded
    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,
    /// Ordered extraction rules
    #[serde(default = "ExtractionRule::defaults")]
    pub rules: Vec<ExtractionRule>,
}

fn default_min_name_length() -> usize {
    3
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_name_length: default_min_name_length(),
            rules: ExtractionRule::defaults(),
        }
    }
}

/// Alias dictionary location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasesConfig {
    /// Path to a TOML alias dictionary; the built-in one is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Report settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Number of companies listed in reports
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load from the default path if present, otherwise use defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::load() {
            Err(ConfigError::FileNotFound(path)) => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("matching.containment_threshold", self.matching.containment_threshold)?;
        validate_threshold("matching.jaccard_threshold", self.matching.jaccard_threshold)?;

        if self.extraction.rules.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "extraction.rules".to_string(),
            });
        }
        for (i, rule) in self.extraction.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: format!("extraction.rules[{}].name", i),
                });
            }
        }
        // Compiling checks every pattern and capture group
        CompanyExtractor::new(&self.extraction.rules)?;

        if self.report.top_n == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "report.top_n".to_string(),
            });
        }

        Ok(())
    }

    /// Build the extractor described by `[extraction]`
    pub fn extractor(&self) -> Result<CompanyExtractor, ConfigError> {
        CompanyExtractor::new(&self.extraction.rules)
    }

    /// Load the alias dictionary named by `[aliases]`, or the built-in one
    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        match &self.aliases.path {
            Some(path) => AliasTable::load_from_path(path),
            None => AliasTable::builtin(),
        }
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        Self::create_default_config_at(Path::new(CONFIG_PATH))
    }

    /// Write the default configuration template to `path`.
    /// Refuses to overwrite an existing file.
    pub fn create_default_config_at(path: &Path) -> Result<PathBuf, ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }
}

fn validate_threshold(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}
