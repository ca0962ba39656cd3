//! Token-aware string similarity on a 0-100 scale.
//!
//! The weighted ratio blends a plain edit-distance ratio with substring and
//! token-order-insensitive variants, picking the best after scaling down the
//! looser ones. It is a heuristic: two unrelated strings can still score high
//! when one is a substring of the other.

use rapidfuzz::distance::indel;
use regex::Regex;
use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;

/// Normalizes strings before scoring and computes the weighted ratio.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    non_word: Regex,
}

impl SimilarityScorer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            non_word: Regex::new(r"\W")?,
        })
    }

    /// Drops non-ASCII characters, replaces every non-word character with a
    /// space, lowercases and trims.
    ///
    /// `"sales.netProductSales.amount"` becomes `"sales netproductsales amount"`.
    pub fn preprocess(&self, text: &str) -> String {
        let ascii: String = text.chars().filter(char::is_ascii).collect();
        self.non_word
            .replace_all(&ascii, " ")
            .to_lowercase()
            .trim()
            .to_string()
    }

    /// Weighted ratio of two raw strings.
    pub fn score(&self, a: &str, b: &str) -> u8 {
        wratio(&self.preprocess(a), &self.preprocess(b))
    }
}

/// Halves round to even.
fn round_score(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Normalized Indel similarity, scaled to 0-100. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    round_score(indel::normalized_similarity(a.chars(), b.chars()) * 100.0)
}

/// Best ratio between the shorter string and any same-length window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer): (Vec<char>, Vec<char>) = if char_len(a) <= char_len(b) {
        (a.chars().collect(), b.chars().collect())
    } else {
        (b.chars().collect(), a.chars().collect())
    };

    let width = shorter.len();
    let mut best = 0.0_f64;
    for window in longer.windows(width) {
        let similarity =
            indel::normalized_similarity(shorter.iter().copied(), window.iter().copied());
        if similarity > 0.995 {
            return 100;
        }
        best = best.max(similarity);
    }

    round_score(best * 100.0)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort(a: &str, b: &str, partial: bool) -> u8 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if partial {
        partial_ratio(&a, &b)
    } else {
        ratio(&a, &b)
    }
}

fn token_set(a: &str, b: &str, partial: bool) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let intersection = join(tokens_a.intersection(&tokens_b).copied().collect());
    let a_only = join(tokens_a.difference(&tokens_b).copied().collect());
    let b_only = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{} {}", intersection, a_only).trim().to_string();
    let combined_b = format!("{} {}", intersection, b_only).trim().to_string();

    let score = if partial { partial_ratio } else { ratio };
    score(&intersection, &combined_a)
        .max(score(&intersection, &combined_b))
        .max(score(&combined_a, &combined_b))
}

/// Ratio after sorting the whitespace-separated tokens of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    token_sort(a, b, false)
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    token_sort(a, b, true)
}

/// Compares the shared tokens against each side's shared-plus-own tokens.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set(a, b, false)
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    token_set(a, b, true)
}

/// Weighted ratio of two already preprocessed strings.
pub fn wratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(a, b));
    let (len_a, len_b) = (char_len(a) as f64, char_len(b) as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    if len_ratio < 1.5 {
        let sort = f64::from(token_sort_ratio(a, b)) * UNBASE_SCALE;
        let set = f64::from(token_set_ratio(a, b)) * UNBASE_SCALE;
        return round_score(base.max(sort).max(set));
    }

    let partial_scale = if len_ratio > 8.0 {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };

    let partial = f64::from(partial_ratio(a, b)) * partial_scale;
    let sort = f64::from(partial_token_sort_ratio(a, b)) * UNBASE_SCALE * partial_scale;
    let set = f64::from(partial_token_set_ratio(a, b)) * UNBASE_SCALE * partial_scale;

    round_score(base.max(partial).max(sort).max(set))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_splits_paths_into_words() {
        let scorer = SimilarityScorer::new().unwrap();
        assert_eq!(
            scorer.preprocess("sales.netProductSales.amount"),
            "sales netproductsales amount"
        );
        assert_eq!(scorer.preprocess("  Low-inventory-level fee "), "low inventory level fee");
        assert_eq!(scorer.preprocess("..."), "");
    }

    #[test]
    fn test_preprocess_drops_non_ascii() {
        let scorer = SimilarityScorer::new().unwrap();
        assert_eq!(scorer.preprocess("Café sales"), "caf sales");
        assert_eq!(scorer.preprocess("€"), "");
        assert_eq!(scorer.score("Nét sales", "Nt sales"), 100);
    }

    #[test]
    fn test_half_scores_round_to_even() {
        assert_eq!(round_score(84.5), 84);
        assert_eq!(round_score(85.5), 86);
        assert_eq!(round_score(79.5), 80);
        assert_eq!(round_score(80.5), 80);
        assert_eq!(round_score(90.25), 90);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("net sales", "net sales"), 100);
        assert_eq!(ratio("net sale", "net sales"), 94);
        assert_eq!(ratio("", "net sales"), 0);
    }

    #[test]
    fn test_partial_ratio_finds_substrings() {
        assert_eq!(partial_ratio("sales", "sales net"), 100);
        assert_eq!(partial_ratio("sales net", "sales"), 100);
        assert!(partial_ratio("fnsku", "net sales") < 50);
    }

    #[test]
    fn test_token_ratios_ignore_order() {
        assert_eq!(token_sort_ratio("sales net", "net sales"), 100);
        assert_eq!(token_set_ratio("net sales amount", "net sales"), 100);
        assert_eq!(token_set_ratio("", "net sales"), 0);
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        let scorer = SimilarityScorer::new().unwrap();
        // underscores are word characters and survive preprocessing
        assert_eq!(scorer.score("net_sales", "Net sales"), 89);
        assert_eq!(scorer.score("Net-Sales", "Net sales"), 100);
        assert_eq!(scorer.score("Units sold", "units SOLD"), 100);
    }

    #[test]
    fn test_misspelled_path_scores_through_shared_token() {
        let scorer = SimilarityScorer::new().unwrap();
        let score = scorer.score("sales.netProductSalesAmt", "Net sales");
        assert!((80..90).contains(&score), "got {}", score);
    }

    #[test]
    fn test_unrelated_strings_score_low() {
        let scorer = SimilarityScorer::new().unwrap();
        assert!(scorer.score("marketplaceId", "Referral fee quantity") < 80);
        assert_eq!(scorer.score("", "Net sales"), 0);
        assert_eq!(scorer.score("???", "Net sales"), 0);
    }
}
