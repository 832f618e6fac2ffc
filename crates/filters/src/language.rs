//! Language detection and filtering
//!
//! Detection sits behind the [`LanguageDetector`] trait so the backing model
//! can be swapped. [`LanguageClassifier`] wraps a detector, folds languages
//! that the detector confuses with Indonesian into `id`, and turns every
//! detection failure into the `"unknown"` sentinel.

use crate::{Error, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use whatlang::Lang;

/// Sentinel returned when no confident verdict is available
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// ISO 639-1 code for Indonesian
pub const INDONESIAN: &str = "id";

/// Codes treated as Indonesian for this dataset (Malay and Tagalog variants)
const INDONESIAN_ALIASES: &[&str] = &["ms", "msa", "zsm", "tl", "tgl", "fil"];

/// Why a detector produced no verdict
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("no language features found in text")]
    NoVerdict,

    #[error("detected '{lang}' with confidence {confidence:.2}, below {threshold:.2}")]
    LowConfidence {
        lang: String,
        confidence: f64,
        threshold: f64,
    },

    #[error("detector failure: {0}")]
    Backend(String),
}

/// A language identification backend
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, returning a language code
    fn detect(&self, text: &str) -> std::result::Result<String, DetectionError>;
}

/// Detector backed by the `whatlang` trigram model
#[derive(Debug, Clone, Default)]
pub struct WhatlangDetector {
    min_confidence: f64,
}

impl WhatlangDetector {
    pub fn new(min_confidence: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(Error::InvalidConfig(
                "Confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(Self { min_confidence })
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> std::result::Result<String, DetectionError> {
        let info = whatlang::detect(text).ok_or(DetectionError::NoVerdict)?;
        let lang = iso639_1(info.lang());

        if info.confidence() < self.min_confidence {
            return Err(DetectionError::LowConfidence {
                lang: lang.to_string(),
                confidence: info.confidence(),
                threshold: self.min_confidence,
            });
        }

        Ok(lang.to_string())
    }
}

/// Two-letter code for a whatlang language, or its ISO 639-3 code when none exists
fn iso639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Ind => "id",
        Lang::Tgl => "tl",
        Lang::Jav => "jv",
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Slk => "sk",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Tur => "tr",
        Lang::Ell => "el",
        Lang::Bul => "bg",
        Lang::Dan => "da",
        Lang::Swe => "sv",
        Lang::Nob => "nb",
        Lang::Fin => "fi",
        Lang::Cat => "ca",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Urd => "ur",
        Lang::Tam => "ta",
        Lang::Tha => "th",
        Lang::Vie => "vi",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        other => other.code(),
    }
}

/// Fold languages commonly confused with Indonesian into `id`
pub fn remap_language(code: &str) -> &str {
    if INDONESIAN_ALIASES.contains(&code) {
        INDONESIAN
    } else {
        code
    }
}

/// Infallible classifier over a [`LanguageDetector`]
pub struct LanguageClassifier {
    detector: Box<dyn LanguageDetector>,
}

impl LanguageClassifier {
    pub fn new(detector: impl LanguageDetector + 'static) -> Self {
        Self {
            detector: Box::new(detector),
        }
    }

    /// Build the default whatlang-backed classifier
    pub fn whatlang(min_confidence: f64) -> Result<Self> {
        Ok(Self::new(WhatlangDetector::new(min_confidence)?))
    }

    /// Detect the language of `text`, never failing
    pub fn detect_language(&self, text: &str) -> String {
        match self.detector.detect(text) {
            Ok(code) => remap_language(&code).to_string(),
            Err(e) => {
                debug!("Language detection failed, using '{}': {}", UNKNOWN_LANGUAGE, e);
                UNKNOWN_LANGUAGE.to_string()
            }
        }
    }

    /// Classify many texts in parallel, returning verdicts in input order
    pub fn classify_batch(&self, texts: &[&str]) -> Vec<String> {
        texts
            .par_iter()
            .map(|text| self.detect_language(text))
            .collect()
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new(WhatlangDetector::default())
    }
}

/// Keeps items whose classified language equals a target
pub struct LanguageFilter<'a> {
    classifier: &'a LanguageClassifier,
    target: String,
}

impl<'a> LanguageFilter<'a> {
    pub fn new(classifier: &'a LanguageClassifier, target: impl Into<String>) -> Self {
        Self {
            classifier,
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check if a classified language matches the target
    pub fn is_accepted(&self, lang: &str) -> bool {
        lang == self.target
    }

    /// Classify every item and keep those in the target language
    ///
    /// Classification runs in parallel; survivors keep their input order and
    /// are paired with their detected language.
    pub fn filter_by_language<T, F>(&self, items: Vec<T>, text_of: F) -> (Vec<(T, String)>, LanguageStats)
    where
        T: Send,
        F: Fn(&T) -> &str + Sync,
    {
        let classified: Vec<(T, String)> = items
            .into_par_iter()
            .map(|item| {
                let lang = self.classifier.detect_language(text_of(&item));
                (item, lang)
            })
            .collect();

        let mut stats = LanguageStats::default();
        let mut kept = Vec::with_capacity(classified.len());

        for (item, lang) in classified {
            stats.record(&lang, self.is_accepted(&lang));
            if self.is_accepted(&lang) {
                kept.push((item, lang));
            }
        }

        (kept, stats)
    }
}

/// Statistics about language detection
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LanguageStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub unknown: usize,
    pub lang_distribution: BTreeMap<String, usize>,
}

impl LanguageStats {
    fn record(&mut self, lang: &str, accepted: bool) {
        self.total += 1;
        if accepted {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
        if lang == UNKNOWN_LANGUAGE {
            self.unknown += 1;
        }
        *self.lang_distribution.entry(lang.to_string()).or_insert(0) += 1;
    }

    /// Get acceptance rate
    pub fn acceptance_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.total as f64
    }
}
