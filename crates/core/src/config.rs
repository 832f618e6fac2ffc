//! Cleaning configuration shared by the pipeline and the validator

use cleanset_filters::{LengthFilterConfig, PunctuationMode};
use serde::{Deserialize, Serialize};

/// The `cleaning` section of a pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Minimum text length in characters (inclusive)
    pub min_length: usize,
    /// Maximum text length in characters (inclusive)
    pub max_length: usize,
    /// Language code to keep; empty or unset skips language filtering
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub punctuation: PunctuationMode,
    /// Detector verdicts below this confidence count as "unknown"
    #[serde(default)]
    pub min_confidence: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 300,
            target_language: Some("id".to_string()),
            punctuation: PunctuationMode::Capped,
            min_confidence: 0.0,
        }
    }
}

impl CleaningConfig {
    pub fn length_bounds(&self) -> LengthFilterConfig {
        LengthFilterConfig::new(self.min_length, self.max_length)
    }

    /// The target language with surrounding whitespace removed, if language
    /// filtering is enabled
    pub fn target_language(&self) -> Option<&str> {
        self.target_language
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
