//! Name similarity scoring
//!
//! Scores two company names in `[0, 1]`. Rules are evaluated in order and
//! the first one that applies decides:
//!
//! 1. equal normalized forms score `1.0`
//! 2. one normalized form contained in the other scores
//!    `len(shorter) / len(longer)` in characters
//! 3. no shared token scores `0.0`
//! 4. otherwise the Jaccard index of the token sets
//!
//! Containment outranks token overlap so an abbreviation that appears inside
//! a longer name is judged by length, not by bag-of-words.

use crate::org_normalizer::{NameForm, TokenSet};
use std::fmt;

/// Minimum containment ratio accepted by [`MatchThresholds::default`].
///
/// Chosen empirically; calibrate against labeled data before relying on it.
pub const DEFAULT_CONTAINMENT_THRESHOLD: f64 = 0.6;

/// Jaccard score must be strictly above this for a token-overlap match.
///
/// Chosen empirically; calibrate against labeled data before relying on it.
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.6;

/// Which scoring rule decided a comparison, with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Identical,
    Containment(f64),
    TokenOverlap(f64),
    Disjoint,
}

impl MatchKind {
    pub fn score(&self) -> f64 {
        match self {
            MatchKind::Identical => 1.0,
            MatchKind::Containment(ratio) => *ratio,
            MatchKind::TokenOverlap(jaccard) => *jaccard,
            MatchKind::Disjoint => 0.0,
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Identical => write!(f, "identical"),
            MatchKind::Containment(ratio) => write!(f, "containment ({:.3})", ratio),
            MatchKind::TokenOverlap(jaccard) => write!(f, "token overlap ({:.3})", jaccard),
            MatchKind::Disjoint => write!(f, "disjoint"),
        }
    }
}

/// Thresholds for deciding that two names denote the same organization.
///
/// Containment is accepted at `>= containment`, token overlap only when
/// strictly `> jaccard`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub containment: f64,
    pub jaccard: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            containment: DEFAULT_CONTAINMENT_THRESHOLD,
            jaccard: DEFAULT_JACCARD_THRESHOLD,
        }
    }
}

impl MatchThresholds {
    pub fn accepts(&self, kind: MatchKind) -> bool {
        match kind {
            MatchKind::Identical => true,
            MatchKind::Containment(ratio) => ratio >= self.containment,
            MatchKind::TokenOverlap(jaccard) => jaccard > self.jaccard,
            MatchKind::Disjoint => false,
        }
    }

    /// Similarity predicate over precomputed forms.
    pub fn matches(&self, a: &NameForm, b: &NameForm) -> bool {
        self.accepts(compare(a, b))
    }

    /// Similarity predicate over raw names.
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        self.matches(&NameForm::new(a), &NameForm::new(b))
    }
}

/// Classify a pair of precomputed name forms.
pub fn compare(a: &NameForm, b: &NameForm) -> MatchKind {
    if a.normalized == b.normalized {
        return MatchKind::Identical;
    }

    if let Some(ratio) = containment_ratio(&a.normalized, &b.normalized) {
        return MatchKind::Containment(ratio);
    }

    if !shares_token(&a.tokens, &b.tokens) {
        return MatchKind::Disjoint;
    }

    MatchKind::TokenOverlap(jaccard(&a.tokens, &b.tokens))
}

/// Similarity score of two raw names in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    compare(&NameForm::new(a), &NameForm::new(b)).score()
}

/// Whether two raw names are similar under the default thresholds.
pub fn is_similar(a: &str, b: &str) -> bool {
    MatchThresholds::default().is_similar(a, b)
}

/// `len(shorter) / len(longer)` when one string contains the other.
pub fn containment_ratio(a: &str, b: &str) -> Option<f64> {
    let (shorter, longer) = if a.chars().count() < b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if !longer.contains(shorter) {
        return None;
    }

    let longer_len = longer.chars().count();
    if longer_len == 0 {
        return Some(1.0);
    }
    Some(shorter.chars().count() as f64 / longer_len as f64)
}

/// Whether two token sets have at least one token in common.
pub fn shares_token(a: &TokenSet, b: &TokenSet) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().any(|token| large.contains(token))
}

/// Intersection over union; `0.0` when both sets are empty.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org_normalizer::tokenize;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // =========================================================================
    // Tests for the scoring rules
    // =========================================================================

    #[test]
    fn test_identical_after_normalization() {
        assert!(approx(similarity("Google", "GOOGLE"), 1.0));
        assert!(approx(similarity("Acme Ltda", "acme"), 1.0));
        assert!(approx(similarity("Itaú", "itau"), 1.0));
    }

    #[test]
    fn test_containment_ratio() {
        // "nubank" inside "nubank pagamentos": 6 / 17
        let s = similarity("Nubank", "Nubank Pagamentos");
        assert!(approx(s, 6.0 / 17.0), "got {}", s);

        // "bcg" inside "boston consulting bcg": 3 / 21
        let s = similarity("BCG", "Boston Consulting Group BCG");
        assert!(approx(s, 3.0 / 21.0), "got {}", s);
    }

    #[test]
    fn test_containment_is_substring_not_token() {
        // "tech" is a substring of "fintech" even though tokens differ
        let kind = compare(&NameForm::new("tech"), &NameForm::new("fintech"));
        assert_eq!(kind, MatchKind::Containment(4.0 / 7.0));
    }

    #[test]
    fn test_jaccard() {
        // {mercado, livre} vs {mercado, libre}: 1 / 3
        let s = similarity("Mercado Livre", "Mercado Libre");
        assert!(approx(s, 1.0 / 3.0), "got {}", s);

        // {alpha, beta, gamma} vs {beta, gamma, delta}: 2 / 4
        let s = similarity("alpha beta gamma", "gamma beta delta");
        assert!(approx(s, 0.5), "got {}", s);
    }

    #[test]
    fn test_disjoint() {
        assert_eq!(similarity("Apple", "Tesla"), 0.0);
        assert_eq!(
            compare(&NameForm::new("Apple"), &NameForm::new("Tesla")),
            MatchKind::Disjoint
        );
    }

    #[test]
    fn test_empty_names() {
        assert!(approx(similarity("", ""), 1.0));
        assert_eq!(similarity("", "google"), 0.0);
        assert!(!is_similar("", "google"));
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("BCG", "Boston Consulting Group BCG"),
            ("Mercado Livre", "Mercado Libre"),
            ("Apple", "Tesla"),
            ("Stone Pagamentos", "Stone"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{} / {}", a, b);
            assert_eq!(is_similar(a, b), is_similar(b, a), "{} / {}", a, b);
        }
    }

    // =========================================================================
    // Tests for the similarity predicate
    // =========================================================================

    #[test]
    fn test_containment_threshold_inclusive() {
        // "abc" inside "abcde": exactly 0.6
        let t = MatchThresholds::default();
        assert!(t.accepts(MatchKind::Containment(0.6)));
        assert!(t.is_similar("abc", "abcde"));
        assert!(!t.accepts(MatchKind::Containment(0.59)));
    }

    #[test]
    fn test_jaccard_threshold_strict() {
        let t = MatchThresholds::default();
        assert!(!t.accepts(MatchKind::TokenOverlap(0.6)));
        assert!(t.accepts(MatchKind::TokenOverlap(0.61)));
    }

    #[test]
    fn test_is_similar_examples() {
        assert!(is_similar("Google", "google ltda"));
        assert!(is_similar("Banco Inter", "Banco Inter SA"));
        // "stone" inside "stone pagamentos": 5 / 16
        assert!(!is_similar("Stone", "Stone Pagamentos"));
        // Jaccard 3/4 over {acme, digital, labs, solutions} vs {acme, digital, labs}
        assert!(is_similar("Acme Digital Labs Solutions", "Acme Labs Digital"));
        assert!(!is_similar("Mercado Livre", "Mercado Libre"));
        assert!(!is_similar("BCG", "Boston Consulting Group BCG"));
    }

    #[test]
    fn test_custom_thresholds() {
        let loose = MatchThresholds {
            containment: 0.3,
            jaccard: 0.3,
        };
        assert!(loose.is_similar("Stone", "Stone Pagamentos"));
        assert!(loose.is_similar("Mercado Livre", "Mercado Libre"));
    }

    // =========================================================================
    // Tests for helpers
    // =========================================================================

    #[test]
    fn test_jaccard_helper() {
        assert_eq!(jaccard(&TokenSet::new(), &TokenSet::new()), 0.0);
        assert!(approx(jaccard(&tokenize("a1 b2"), &tokenize("b2 a1")), 1.0));
    }

    #[test]
    fn test_shares_token() {
        assert!(shares_token(&tokenize("stone co"), &tokenize("stone pagamentos")));
        assert!(!shares_token(&tokenize("apple"), &tokenize("tesla")));
    }

    #[test]
    fn test_match_kind_display() {
        assert_eq!(MatchKind::Identical.to_string(), "identical");
        assert_eq!(MatchKind::Containment(0.5).to_string(), "containment (0.500)");
        assert_eq!(MatchKind::Disjoint.to_string(), "disjoint");
    }
}
