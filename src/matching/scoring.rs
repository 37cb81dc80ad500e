use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Length ratio below which two strings are compared whole rather than partially
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Length ratio above which partial matches are heavily discounted
const LONG_LENGTH_RATIO: f64 = 8.0;

/// Discount applied to token-based scores inside [`Similarity::weighted_ratio`]
const TOKEN_SCALE: f64 = 0.95;

/// Safely convert usize to f64 for ratio calculations
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Fuzzy string similarity primitives.
///
/// Every score is normalized to `[0, 100]` and comparisons are case-insensitive:
/// implementations receive raw text and must lowercase and trim it themselves.
/// Only [`Similarity::ratio`] is required; the other scores are derived from it
/// and may be overridden by implementations with a faster native version.
pub trait Similarity {
    /// Whole-string similarity. Two empty strings score 100, one empty string scores 0.
    fn ratio(&self, a: &str, b: &str) -> f64;

    /// Best [`Similarity::ratio`] of the shorter string against every window of the
    /// longer string with the same character length.
    fn partial_ratio(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        let (short, long) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };

        if short.is_empty() {
            return if long.is_empty() { 100.0 } else { 0.0 };
        }

        let long_chars: Vec<char> = long.chars().collect();
        let width = short.chars().count();
        if width == long_chars.len() {
            return self.ratio(&short, &long);
        }

        let mut best = 0.0_f64;
        for window in long_chars.windows(width) {
            let candidate: String = window.iter().collect();
            let score = self.ratio(&short, &candidate);
            if score > best {
                best = score;
                if best >= 100.0 {
                    break;
                }
            }
        }
        best
    }

    /// Order-insensitive comparison of the word sets of both strings.
    ///
    /// Words are maximal alphanumeric runs. When one word set is a subset of the
    /// other (and they share at least one word) the score is 100.
    fn token_set_ratio(&self, a: &str, b: &str) -> f64 {
        let tokens_a = tokenize(a);
        let tokens_b = tokenize(b);
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0.0;
        }

        let sect: Vec<&str> = tokens_a.intersection(&tokens_b).map(String::as_str).collect();
        let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
        let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

        if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
            return 100.0;
        }

        let sect_str = sect.join(" ");
        let combined_ab = join_nonempty(&sect_str, &diff_ab.join(" "));
        let combined_ba = join_nonempty(&sect_str, &diff_ba.join(" "));

        let mut best = self.ratio(&combined_ab, &combined_ba);
        if !sect_str.is_empty() {
            best = best
                .max(self.ratio(&sect_str, &combined_ab))
                .max(self.ratio(&sect_str, &combined_ba));
        }
        best
    }

    /// [`Similarity::ratio`] over the alphabetically sorted words of both strings
    fn token_sort_ratio(&self, a: &str, b: &str) -> f64 {
        let sorted_a = sorted_tokens(a);
        let sorted_b = sorted_tokens(b);
        if sorted_a.is_empty() || sorted_b.is_empty() {
            return 0.0;
        }
        self.ratio(&sorted_a, &sorted_b)
    }

    /// Length-aware blend of the other scores.
    ///
    /// Strings of similar length are compared whole and by word sets; when one
    /// string is at least 1.5x longer, partial containment dominates, discounted
    /// more heavily once the length ratio exceeds 8.
    fn weighted_ratio(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let len_a = count_to_f64(a.chars().count());
        let len_b = count_to_f64(b.chars().count());
        let len_ratio = len_a.max(len_b) / len_a.min(len_b);

        let whole = self.ratio(&a, &b);
        if len_ratio < PARTIAL_LENGTH_RATIO {
            let tokens = self.token_sort_ratio(&a, &b).max(self.token_set_ratio(&a, &b));
            return whole.max(tokens * TOKEN_SCALE);
        }

        let partial_scale = if len_ratio <= LONG_LENGTH_RATIO {
            0.9
        } else {
            0.6
        };
        whole
            .max(self.partial_ratio(&a, &b) * partial_scale)
            .max(self.token_set_ratio(&a, &b) * TOKEN_SCALE * partial_scale)
    }
}

/// Levenshtein-based scorer backed by `strsim`
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Similarity for Levenshtein {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        if a.is_empty() && b.is_empty() {
            return 100.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        normalized_levenshtein(&a, &b) * 100.0
    }
}

/// Lowercase and trim text before scoring
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split text into its set of lowercase alphanumeric words
fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn sorted_tokens(text: &str) -> String {
    let mut words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    words.sort_unstable();
    words.join(" ")
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_ratio_is_case_insensitive() {
        let s = Levenshtein;
        assert!(close(s.ratio("Vegan", "vegan"), 100.0));
        assert!(close(s.ratio("  tomato ", "TOMATO"), 100.0));
    }

    #[test]
    fn test_ratio_single_typo() {
        let s = Levenshtein;
        // one substitution in five characters
        assert!(close(s.ratio("vegen", "vegan"), 80.0));
        assert!(s.ratio("vegan", "vegetarian") < 75.0);
    }

    #[test]
    fn test_ratio_empty_inputs() {
        let s = Levenshtein;
        assert!(close(s.ratio("", ""), 100.0));
        assert!(close(s.ratio("", "basil"), 0.0));
    }

    #[test]
    fn test_partial_ratio_containment() {
        let s = Levenshtein;
        assert!(close(s.partial_ratio("cheese", "cheddar cheese"), 100.0));
        assert!(close(s.partial_ratio("chicken broth", "chicken"), 100.0));
        assert!(s.partial_ratio("cheese", "tomato") < 70.0);
    }

    #[test]
    fn test_partial_ratio_tolerates_typo() {
        let s = Levenshtein;
        // best window "chiken " is two edits away from "chicken"
        assert!(s.partial_ratio("chicken", "chiken broth") >= 70.0);
    }

    #[test]
    fn test_token_set_ratio_subset() {
        let s = Levenshtein;
        assert!(close(
            s.token_set_ratio("tomato, basil", "tomato, basil, garlic, olive oil"),
            100.0
        ));
        assert!(close(s.token_set_ratio("basil tomato", "tomato basil"), 100.0));
    }

    #[test]
    fn test_token_set_ratio_disjoint() {
        let s = Levenshtein;
        assert!(s.token_set_ratio("banana", "chicken broth") < 50.0);
        assert!(close(s.token_set_ratio("", "chicken"), 0.0));
    }

    #[test]
    fn test_weighted_ratio_prefers_contained_names() {
        let s = Levenshtein;
        let contained = s.weighted_ratio("chicken noodle soup", "chicken noodle soup (vegetarian)");
        assert!(close(contained, 90.0));
        assert!(close(s.weighted_ratio("pancakes", "Pancakes"), 100.0));
        assert!(close(s.weighted_ratio("qqqq", "pancakes"), 0.0));
    }

    #[test]
    fn test_weighted_ratio_empty() {
        let s = Levenshtein;
        assert!(close(s.weighted_ratio("", "pancakes"), 0.0));
    }
}
