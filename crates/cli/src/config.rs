//! Configuration file support for cleaning pipelines

use anyhow::{Context, Result};
use cleanset_core::CleaningConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names written under the output directory
pub const CLEANED_DATA_FILE: &str = "cleaned_data.jsonl";
pub const CLEANING_LOG_FILE: &str = "cleaning_log.csv";
pub const VALIDATION_REPORT_FILE: &str = "validation_report.json";

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
}

impl PipelineConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                    extension
                ))
            }
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Indonesian customer-message baseline
    pub fn default_indonesian() -> Self {
        Self {
            input: InputConfig {
                path: PathBuf::from("data/raw/messages.csv"),
            },
            output: OutputConfig {
                dir: PathBuf::from("data/processed"),
            },
            cleaning: CleaningConfig::default(),
        }
    }

    /// Apply command-line overrides of the input path and output directory
    pub fn with_overrides(mut self, input: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input.path = input;
        }
        if let Some(dir) = output_dir {
            self.output.dir = dir;
        }
        self
    }
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Raw dataset (`.csv`, `.tsv`, `.jsonl`, optionally `.gz`)
    pub path: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the cleaned data, log and report
    pub dir: PathBuf,
}

impl OutputConfig {
    pub fn cleaned_data(&self) -> PathBuf {
        self.dir.join(CLEANED_DATA_FILE)
    }

    pub fn cleaning_log(&self) -> PathBuf {
        self.dir.join(CLEANING_LOG_FILE)
    }

    pub fn validation_report(&self) -> PathBuf {
        self.dir.join(VALIDATION_REPORT_FILE)
    }
}
