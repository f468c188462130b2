use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::Word;

/// A sentence-scale run of consecutive words, the unit handed to phrase analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position of this segment in the recording
    pub index: usize,
    /// Concatenated display text with spacing stripped
    pub text: String,
    /// Start time in seconds (from first word)
    pub start: f64,
    /// End time in seconds (from last word)
    pub end: f64,
    /// Range into the recording's word array
    pub word_range: Range<usize>,
}

impl Segment {
    /// Build a segment over `all_words[word_range]`
    pub fn from_words(index: usize, word_range: Range<usize>, all_words: &[Word]) -> Self {
        let words = all_words.get(word_range.clone()).unwrap_or(&[]);
        let text = words
            .iter()
            .flat_map(|w| w.display_text().chars())
            .filter(|c| !c.is_whitespace())
            .collect();

        Self {
            index,
            text,
            start: words.first().map(|w| w.start).unwrap_or(0.0),
            end: words.last().map(|w| w.end).unwrap_or(0.0),
            word_range,
        }
    }

    /// The words this segment covers
    pub fn words<'a>(&self, all_words: &'a [Word]) -> &'a [Word] {
        all_words.get(self.word_range.clone()).unwrap_or(&[])
    }

    /// Number of words in this segment
    pub fn word_count(&self) -> usize {
        self.word_range.len()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Text of up to `count` segments preceding `index`, oldest first.
///
/// Given to phrase analysis as disambiguation context only.
pub fn context_before(segments: &[Segment], index: usize, count: usize) -> String {
    let end = index.min(segments.len());
    let start = end.saturating_sub(count);
    segments[start..end]
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<Word> {
        vec![
            Word::new("今日", 0.0, 0.3),
            Word::new("は", 0.3, 0.4).with_punctuation("は、"),
            Word::new("晴れ", 0.5, 0.8),
            Word::new("です", 0.8, 1.1).with_punctuation("です。"),
        ]
    }

    #[test]
    fn test_from_words() {
        let all = words();
        let segment = Segment::from_words(0, 1..4, &all);

        assert_eq!(segment.text, "は、晴れです。");
        assert_eq!(segment.start, 0.3);
        assert_eq!(segment.end, 1.1);
        assert_eq!(segment.word_count(), 3);
        assert_eq!(segment.words(&all).len(), 3);
        assert_eq!(segment.words(&all)[0].text, "は");
    }

    #[test]
    fn test_words_out_of_range_is_empty() {
        let all = words();
        let segment = Segment::from_words(0, 2..9, &all);
        assert!(segment.words(&all).is_empty());
        assert_eq!(segment.text, "");
    }

    #[test]
    fn test_context_before() {
        let all = words();
        let segments = vec![
            Segment::from_words(0, 0..1, &all),
            Segment::from_words(1, 1..2, &all),
            Segment::from_words(2, 2..4, &all),
        ];

        assert_eq!(context_before(&segments, 0, 2), "");
        assert_eq!(context_before(&segments, 1, 2), "今日");
        assert_eq!(context_before(&segments, 2, 2), "今日 は、");
        assert_eq!(context_before(&segments, 2, 1), "は、");
    }
}
