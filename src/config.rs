//! Configuration management for the skill gap analyzer

use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub reconcile: ReconcileConfig,
    pub output: OutputConfig,
}

/// Tunables for the extraction pipeline. Confidences are named options
/// rather than constants buried in match arms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Maximum sliding n-gram width over whitespace-delimited tokens.
    pub max_ngram_width: usize,
    /// Confidence for a raw surface-form match.
    pub exact_confidence: f32,
    /// Confidence for a single-token normalized alias match.
    pub alias_confidence: f32,
    /// Confidence for a multi-token normalized alias match.
    pub ngram_confidence: f32,
    /// Minimum confidence a fuzzy match must reach to be kept.
    pub fuzzy_floor: f32,
    /// Candidate phrases shorter than this never enter fuzzy matching.
    pub min_fuzzy_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Resume confidence at or above this counts a required skill as matched.
    pub match_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!(
                "Invalid output format: {}. Supported: console, json, markdown",
                s
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            reconcile: ReconcileConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_ngram_width: 3,
            exact_confidence: 1.0,
            alias_confidence: 0.9,
            ngram_confidence: 0.85,
            fuzzy_floor: 0.6,
            min_fuzzy_chars: 3,
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            SkillGapError::Configuration(format!("Failed to parse config: {}", e))
        })
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            SkillGapError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skillgap")
            .join("config.toml")
    }

    /// Set a configuration value by dotted key, e.g. "reconcile.match_threshold".
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "extraction.max_ngram_width" => {
                self.extraction.max_ngram_width = parse_value(key, value)?
            }
            "extraction.exact_confidence" => {
                self.extraction.exact_confidence = parse_value(key, value)?
            }
            "extraction.alias_confidence" => {
                self.extraction.alias_confidence = parse_value(key, value)?
            }
            "extraction.ngram_confidence" => {
                self.extraction.ngram_confidence = parse_value(key, value)?
            }
            "extraction.fuzzy_floor" => self.extraction.fuzzy_floor = parse_value(key, value)?,
            "extraction.min_fuzzy_chars" => {
                self.extraction.min_fuzzy_chars = parse_value(key, value)?
            }
            "reconcile.match_threshold" => {
                self.reconcile.match_threshold = parse_value(key, value)?
            }
            "output.format" => {
                self.output.format = value
                    .parse()
                    .map_err(SkillGapError::Configuration)?
            }
            "output.detailed" => self.output.detailed = parse_value(key, value)?,
            "output.color_output" => self.output.color_output = parse_value(key, value)?,
            _ => {
                return Err(SkillGapError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        SkillGapError::Configuration(format!("Invalid value for {}: {}", key, value))
    })
}
