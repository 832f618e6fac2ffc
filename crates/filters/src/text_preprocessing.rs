//! Text normalization for short messages
//!
//! Collapses whitespace and caps runs of repeated `.`, `!` and `?`.
//! Whitespace is always normalized before punctuation, since the
//! punctuation pass expects runs that are no longer broken up by spaces.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| {
        Regex::new(r"\s+").expect("Failed to compile whitespace regex")
    })
}

/// Trim the text and collapse every whitespace run into a single space
pub fn normalize_whitespace(text: &str) -> String {
    get_whitespace_regex()
        .replace_all(text.trim(), " ")
        .into_owned()
}

/// Cap repeated punctuation using the default policy
///
/// Any run of two or more `.`, `!` or `?` becomes exactly two characters.
pub fn normalize_punctuation(text: &str) -> String {
    get_capped_rules().apply(text).into_owned()
}

/// Whitespace normalization followed by punctuation normalization
pub fn normalize_text(text: &str) -> String {
    normalize_punctuation(&normalize_whitespace(text))
}

static CAPPED_RULES: OnceLock<PunctuationRules> = OnceLock::new();

fn get_capped_rules() -> &'static PunctuationRules {
    CAPPED_RULES.get_or_init(|| PunctuationRules::compile(PunctuationPolicy::capped()))
}

/// Maximum run length kept for each emphasis character
///
/// A run longer than its cap is shortened to exactly the cap;
/// runs at or below the cap are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PunctuationPolicy {
    pub max_dots: usize,
    pub max_exclamations: usize,
    pub max_questions: usize,
}

impl PunctuationPolicy {
    /// Cap every run of `.`, `!`, `?` at two characters (default)
    pub fn capped() -> Self {
        Self {
            max_dots: 2,
            max_exclamations: 2,
            max_questions: 2,
        }
    }

    /// Older, more lenient caps: `.` at 5, `!` at 5, `?` at 3
    pub fn legacy() -> Self {
        Self {
            max_dots: 5,
            max_exclamations: 5,
            max_questions: 3,
        }
    }

    fn caps(&self) -> [(char, usize); 3] {
        [
            ('.', self.max_dots),
            ('!', self.max_exclamations),
            ('?', self.max_questions),
        ]
    }
}

impl Default for PunctuationPolicy {
    fn default() -> Self {
        Self::capped()
    }
}

/// Compiled run-capping patterns for a [`PunctuationPolicy`]
#[derive(Debug, Clone)]
struct PunctuationRules {
    rules: Vec<(Regex, String)>,
}

impl PunctuationRules {
    fn compile(policy: PunctuationPolicy) -> Self {
        let rules = policy
            .caps()
            .into_iter()
            .map(|(c, cap)| {
                let run = c.to_string();
                let pattern = format!("{}{{{},}}", regex::escape(&run), cap + 1);
                let regex = Regex::new(&pattern).expect("Failed to compile punctuation regex");
                (regex, run.repeat(cap))
            })
            .collect();

        Self { rules }
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut result = Cow::Borrowed(text);
        for (regex, replacement) in &self.rules {
            let replaced = match regex.replace_all(&result, NoExpand(replacement.as_str())) {
                Cow::Owned(replaced) => Some(replaced),
                Cow::Borrowed(_) => None,
            };
            if let Some(replaced) = replaced {
                result = Cow::Owned(replaced);
            }
        }
        result
    }
}

/// Named punctuation policy, as written in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunctuationMode {
    #[default]
    Capped,
    Legacy,
}

impl PunctuationMode {
    pub fn policy(self) -> PunctuationPolicy {
        match self {
            PunctuationMode::Capped => PunctuationPolicy::capped(),
            PunctuationMode::Legacy => PunctuationPolicy::legacy(),
        }
    }
}

/// Full message normalizer
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    policy: PunctuationPolicy,
    rules: PunctuationRules,
}

impl TextNormalizer {
    pub fn new(policy: PunctuationPolicy) -> Self {
        Self {
            policy,
            rules: PunctuationRules::compile(policy),
        }
    }

    pub fn policy(&self) -> PunctuationPolicy {
        self.policy
    }

    /// Normalize text according to configuration
    ///
    /// Applies transformations in the following order:
    /// 1. Whitespace trimming and collapsing
    /// 2. Punctuation run capping
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = normalize_whitespace(text);
        if let Cow::Owned(capped) = self.rules.apply(&collapsed) {
            return capped;
        }
        collapsed
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(PunctuationPolicy::capped())
    }
}

impl From<PunctuationMode> for TextNormalizer {
    fn from(mode: PunctuationMode) -> Self {
        Self::new(mode.policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_normalization() {
        assert_eq!(normalize_whitespace("  Hello   World  "), "Hello World");
        assert_eq!(normalize_whitespace("a\t\tb\n\nc"), "a b c");
        assert_eq!(normalize_whitespace("\n mixed \t \r\n runs "), "mixed runs");
    }

    #[test]
    fn test_whitespace_empty_and_blank() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("   \t\n   "), "");
    }

    #[test]
    fn test_whitespace_idempotent() {
        let samples = [
            "  saldo  saya \t hilang\n\n",
            "already clean",
            "",
            " \u{a0}non-breaking\u{a0} space ",
        ];

        for s in samples {
            let once = normalize_whitespace(s);
            assert_eq!(normalize_whitespace(&once), once);
        }
    }

    #[test]
    fn test_punctuation_long_runs_capped_to_two() {
        assert_eq!(normalize_punctuation("wait......"), "wait..");
        assert_eq!(normalize_punctuation("tolong!!!!!"), "tolong!!");
        assert_eq!(normalize_punctuation("kenapa???"), "kenapa??");
    }

    #[test]
    fn test_punctuation_short_runs_unchanged() {
        assert_eq!(normalize_punctuation("ok."), "ok.");
        assert_eq!(normalize_punctuation("ok.."), "ok..");
        assert_eq!(normalize_punctuation("why?!"), "why?!");
        assert_eq!(normalize_punctuation("no!!"), "no!!");
    }

    #[test]
    fn test_punctuation_mixed_runs_capped_separately() {
        assert_eq!(normalize_punctuation("what?!?!?!"), "what?!?!?!");
        assert_eq!(normalize_punctuation("what???!!!..."), "what??!!..");
    }

    #[test]
    fn test_legacy_policy() {
        let normalizer = TextNormalizer::new(PunctuationPolicy::legacy());
        assert_eq!(normalizer.normalize("hmm......."), "hmm.....");
        assert_eq!(normalizer.normalize("hmm....."), "hmm.....");
        assert_eq!(normalizer.normalize("wow!!!!!!!!"), "wow!!!!!");
        assert_eq!(normalizer.normalize("huh????"), "huh???");
        assert_eq!(normalizer.normalize("huh???"), "huh???");
    }

    #[test]
    fn test_custom_caps() {
        let normalizer = TextNormalizer::new(PunctuationPolicy {
            max_dots: 1,
            max_exclamations: 3,
            max_questions: 1,
        });
        assert_eq!(normalizer.normalize("a... b!!!!! c??"), "a. b!!! c?");
    }

    #[test]
    fn test_unchanged_text_passes_through() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("sudah rapi."), "sudah rapi.");
        assert_eq!(normalize_punctuation("ok"), "ok");
    }

    #[test]
    fn test_normalize_text_order() {
        assert_eq!(normalize_text("  halo!!!!   apa kabar????  "), "halo!! apa kabar??");
        assert_eq!(normalize_text("\tkok lama....\n"), "kok lama..");
    }

    #[test]
    fn test_normalizer_from_mode() {
        let normalizer = TextNormalizer::from(PunctuationMode::Legacy);
        assert_eq!(normalizer.policy(), PunctuationPolicy::legacy());
        assert_eq!(normalizer.normalize("  ya ampun!!!!!!  "), "ya ampun!!!!!");

        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("  ya ampun!!!!!!  "), "ya ampun!!");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(normalize_text("  こんにちは。。。  "), "こんにちは。。。");
        assert_eq!(normalize_text("emoji 😊😊 ok..."), "emoji 😊😊 ok..");
    }
}
