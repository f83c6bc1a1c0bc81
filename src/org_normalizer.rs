//! Organization Name Normalization
//!
//! Turns a raw company string into a comparable form:
//! - Case folding: GOOGLE vs Google vs google
//! - Diacritics: Itaú -> itau, Cosméticos -> cosmeticos
//! - Legal-entity suffixes and country words: "Bosch Brasil S.A." -> "bosch s"
//! - Connector stopwords: "Companhia de Bebidas das Américas" -> "companhia bebidas americas"
//! - Punctuation: "amazon.com" -> "amazon com"
//!
//! Two names are the same organization by identity only when their
//! normalized strings are equal. Token sets are derived from the normalized
//! string and used for similarity scoring.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Legal-entity suffixes and country words removed as whole words.
pub const LEGAL_SUFFIXES: &[&str] = &[
    "ltda",
    "ltd",
    "inc",
    "corp",
    "corporation",
    "sa",
    "s.a.",
    "llc",
    "limited",
    "group",
    "grupo",
    "brasil",
    "brazil",
];

/// Articles and Portuguese connectors that carry no identity.
pub const STOPWORDS: &[&str] = &["the", "a", "an", "e", "da", "do", "de", "das", "dos"];

static SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| word_list_regex(LEGAL_SUFFIXES));

static STOPWORD_REGEX: Lazy<Regex> = Lazy::new(|| word_list_regex(STOPWORDS));

static NON_WORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s]").unwrap()
});

/// Sorted, deduplicated tokens of a normalized name.
pub type TokenSet = BTreeSet<String>;

/// Build a `\b(?:w1|w2|...)\b` pattern. Alternation order is kept so that
/// leftmost-first matching behaves the same as the declared list.
fn word_list_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).unwrap()
}

/// Normalize a company name.
///
/// Steps, in order:
/// 1. lower-case
/// 2. NFD decomposition, then drop combining diacritical marks (U+0300..U+036F)
/// 3. remove whole-word legal suffixes ([`LEGAL_SUFFIXES`])
/// 4. remove whole-word stopwords ([`STOPWORDS`])
/// 5. replace anything that is not a letter, number or whitespace with a space
/// 6. collapse whitespace and trim
///
/// An empty result means "no company".
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let folded = strip_diacritics(&lower);
    let without_suffixes = SUFFIX_REGEX.replace_all(&folded, "");
    let without_stopwords = STOPWORD_REGEX.replace_all(&without_suffixes, "");
    let cleaned = NON_WORD_REGEX.replace_all(&without_stopwords, " ");
    normalize_whitespace(&cleaned)
}

/// Tokens of length > 1 from the normalized name, as a sorted set.
pub fn tokenize(name: &str) -> TokenSet {
    tokens_of_normalized(&normalize(name))
}

/// Tokenize a string that is already normalized.
pub fn tokens_of_normalized(normalized: &str) -> TokenSet {
    normalized
        .split(' ')
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Replace punctuation with spaces and collapse whitespace, keeping case and
/// diacritics. Used to tidy a raw extracted company before it is counted.
pub fn strip_punctuation(name: &str) -> String {
    normalize_whitespace(&NON_WORD_REGEX.replace_all(name, " "))
}

/// Decompose and drop combining diacritical marks: "itaú" -> "itau".
fn strip_diacritics(s: &str) -> String {
    s.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Normalize whitespace: collapse runs, trim.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// A name together with its normalized form and token set, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameForm {
    pub normalized: String,
    pub tokens: TokenSet,
}

impl NameForm {
    pub fn new(name: &str) -> Self {
        let normalized = normalize(name);
        let tokens = tokens_of_normalized(&normalized);
        Self { normalized, tokens }
    }

    /// True when normalization removed everything.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}
