//! Length-based filtering for text content
//!
//! Lengths are counted in characters, not bytes, so multi-byte scripts
//! and emoji count once per code point.

use serde::{Deserialize, Serialize};

/// Inclusive character-length bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthFilterConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for LengthFilterConfig {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 300,
        }
    }
}

/// Where a text length falls relative to the bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthVerdict {
    TooShort,
    InRange,
    TooLong,
}

impl LengthFilterConfig {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }

    /// Classify a character length against the bounds
    ///
    /// With `min_length > max_length` nothing is in range.
    pub fn verdict(&self, length: usize) -> LengthVerdict {
        if length < self.min_length {
            LengthVerdict::TooShort
        } else if length > self.max_length {
            LengthVerdict::TooLong
        } else {
            LengthVerdict::InRange
        }
    }

    /// Check if a text passes the length filter, returning its length
    pub fn accepts(&self, text: &str) -> (bool, usize) {
        let length = text_length(text);
        (self.verdict(length) == LengthVerdict::InRange, length)
    }
}

/// Character count of a text
pub fn text_length(text: &str) -> usize {
    text.chars().count()
}

/// Keep the texts whose length lies within the bounds, paired with that length
///
/// Input order is preserved.
pub fn filter_by_length<'a, I>(texts: I, config: &LengthFilterConfig) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .filter_map(|text| match config.accepts(text) {
            (true, length) => Some((text, length)),
            (false, _) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_filter_min() {
        let config = LengthFilterConfig::new(5, usize::MAX);

        assert!(config.accepts("hello").0);
        assert!(config.accepts("hello world").0);
        assert!(!config.accepts("hi").0);
    }

    #[test]
    fn test_length_filter_max() {
        let config = LengthFilterConfig::new(0, 10);

        assert!(config.accepts("hello").0);
        assert!(!config.accepts("hello world!").0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let config = LengthFilterConfig::new(5, 11);

        assert_eq!(config.verdict(4), LengthVerdict::TooShort);
        assert_eq!(config.verdict(5), LengthVerdict::InRange);
        assert_eq!(config.verdict(11), LengthVerdict::InRange);
        assert_eq!(config.verdict(12), LengthVerdict::TooLong);
    }

    #[test]
    fn test_filter_by_length_keeps_order() {
        let config = LengthFilterConfig::new(5, 25);
        let kept = filter_by_length(["hi", "hello world", "this is a longer msg"], &config);

        assert_eq!(
            kept,
            vec![("hello world", 11), ("this is a longer msg", 20)]
        );
    }

    #[test]
    fn test_inverted_bounds_keep_nothing() {
        let config = LengthFilterConfig::new(10, 5);
        let kept = filter_by_length(["short", "exactly ten", "1234567"], &config);

        assert!(kept.is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        assert_eq!(text_length("héllo"), 5);
        assert_eq!(text_length("😊😊"), 2);
        assert_eq!(text_length("terima kasih"), 12);
    }
}
