use crate::config::{AlignerConfig, MatcherKind};

/// Edit-distance similarity scaled to 0-100
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// A contiguous run of words chosen as the best match for a phrase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMatch {
    /// Index of the first word in the window
    pub first: usize,
    /// Index of the last word in the window (inclusive)
    pub last: usize,
    /// Raw similarity (0-100)
    pub score: f64,
}

/// Strategy for locating phrase text inside a word sequence.
///
/// All inputs are already normalized; `words[i]` is the normalized display
/// text of word `i`.
pub trait WindowMatcher: Send + Sync {
    /// Best window for `phrase` among `words[from..]`, if any
    fn best_window(&self, phrase: &str, words: &[String], from: usize) -> Option<WindowMatch>;

    /// Closest of `candidates` to `key` and its similarity, if this strategy scores at all
    fn closest<'a>(&self, key: &str, candidates: &'a [String]) -> Option<(&'a str, f64)>;

    fn name(&self) -> &'static str;
}

impl MatcherKind {
    /// Resolve the configured strategy once
    pub fn build(self, config: &AlignerConfig) -> Box<dyn WindowMatcher> {
        match self {
            MatcherKind::Fuzzy => Box::new(FuzzyMatcher::new(config.length_bonus)),
            MatcherKind::Exact => Box::new(ExactMatcher),
        }
    }
}

/// Exhaustive search over every window, scored by edit-distance similarity
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    length_bonus: f64,
}

impl FuzzyMatcher {
    pub fn new(length_bonus: f64) -> Self {
        Self { length_bonus }
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl WindowMatcher for FuzzyMatcher {
    fn best_window(&self, phrase: &str, words: &[String], from: usize) -> Option<WindowMatch> {
        let n = words.len();
        let mut best: Option<WindowMatch> = None;
        let mut best_adjusted = 0.0;

        // Every width, every offset: boundary disagreement can go either way
        for width in 1..=n.saturating_sub(from) {
            for first in from..=(n - width) {
                let window = words[first..first + width].concat();
                if window.is_empty() {
                    continue;
                }

                let score = similarity_ratio(phrase, &window);
                let adjusted = score * (1.0 + self.length_bonus * window.chars().count() as f64);

                if adjusted > best_adjusted {
                    best_adjusted = adjusted;
                    best = Some(WindowMatch {
                        first,
                        last: first + width - 1,
                        score,
                    });
                }
            }
        }

        best
    }

    fn closest<'a>(&self, key: &str, candidates: &'a [String]) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for candidate in candidates {
            let score = similarity_ratio(key, candidate);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((candidate.as_str(), score));
            }
        }
        best
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

/// Exact substring search; used when approximate scoring is unwanted
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl WindowMatcher for ExactMatcher {
    fn best_window(&self, phrase: &str, words: &[String], from: usize) -> Option<WindowMatch> {
        if phrase.is_empty() || from >= words.len() {
            return None;
        }

        let remaining = &words[from..];
        let full: String = remaining.concat();
        let match_start = full.find(phrase)?;
        let match_end = match_start + phrase.len() - 1;

        // Walk accumulated word lengths until both offsets land inside a word
        let mut first = None;
        let mut offset = 0;
        for (i, word) in remaining.iter().enumerate() {
            let next = offset + word.len();
            if first.is_none() && (offset..next).contains(&match_start) {
                first = Some(i);
            }
            if (offset..next).contains(&match_end) {
                return first.map(|f| WindowMatch {
                    first: from + f,
                    last: from + i,
                    score: 100.0,
                });
            }
            offset = next;
        }

        None
    }

    fn closest<'a>(&self, _key: &str, _candidates: &'a [String]) -> Option<(&'a str, f64)> {
        None
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_similarity_ratio_bounds() {
        assert_eq!(similarity_ratio("日本語", "日本語"), 100.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        let partial = similarity_ratio("日本語です", "日本語");
        assert!(partial > 50.0 && partial < 100.0);
    }

    #[test]
    fn test_fuzzy_prefers_fuller_window() {
        let matcher = FuzzyMatcher::default();
        let words = words(&["は", "日本語", "です"]);

        let m = matcher.best_window("日本語です", &words, 0).unwrap();
        assert_eq!((m.first, m.last), (1, 2));
        assert_eq!(m.score, 100.0);
    }

    #[test]
    fn test_fuzzy_respects_search_start() {
        let matcher = FuzzyMatcher::default();
        let words = words(&["日本語", "です", "日本語", "です"]);

        let m = matcher.best_window("日本語です", &words, 1).unwrap();
        assert_eq!((m.first, m.last), (2, 3));
    }

    #[test]
    fn test_fuzzy_skips_empty_windows() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.best_window("abc", &words(&["", ""]), 0).is_none());
        assert!(matcher.best_window("abc", &words(&["a"]), 1).is_none());
    }

    #[test]
    fn test_fuzzy_closest() {
        let matcher = FuzzyMatcher::default();
        let keys = words(&["東京", "東京タワー", "タワー"]);
        let (key, score) = matcher.closest("東京タワ", &keys).unwrap();
        assert_eq!(key, "東京タワー");
        assert!(score > 79.0);
    }

    #[test]
    fn test_exact_maps_offsets_to_words() {
        let matcher = ExactMatcher;
        let words = words(&["今日", "は", "日本語", "です", "ね"]);

        let m = matcher.best_window("日本語です", &words, 0).unwrap();
        assert_eq!((m.first, m.last, m.score), (2, 3, 100.0));

        // Match starting mid-word still maps to the containing words
        let m = matcher.best_window("本語で", &words, 1).unwrap();
        assert_eq!((m.first, m.last), (2, 3));
    }

    #[test]
    fn test_exact_only_searches_from_cursor() {
        let matcher = ExactMatcher;
        let words = words(&["今日", "は", "今日"]);

        let m = matcher.best_window("今日", &words, 1).unwrap();
        assert_eq!((m.first, m.last), (2, 2));
        assert!(matcher.best_window("晴れ", &words, 0).is_none());
        assert!(matcher.closest("今日", &words).is_none());
    }
}
