//! Text filters for message cleaning
//!
//! This crate provides the per-record text stages of the cleaning
//! pipeline: normalization, length bounds and language identification.

pub mod error;
pub mod language;
pub mod length_filter;
pub mod text_preprocessing;

pub use error::{Error, Result};
pub use language::{
    DetectionError, LanguageClassifier, LanguageDetector, LanguageFilter, LanguageStats,
    WhatlangDetector, INDONESIAN, UNKNOWN_LANGUAGE,
};
pub use length_filter::{text_length, LengthFilterConfig, LengthVerdict};
pub use text_preprocessing::{
    normalize_punctuation, normalize_text, normalize_whitespace, PunctuationMode,
    PunctuationPolicy, TextNormalizer,
};
