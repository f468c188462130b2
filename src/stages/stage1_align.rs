use std::ops::Range;

use tracing::{debug, warn};

use crate::config::AlignerConfig;
use crate::matching::{normalize, WindowMatcher};
use crate::models::{AlignedPhrase, MatchQuality, PhraseAnalysis, Segment, SegmentAlignment, Word};

/// Result of aligning one phrase against a word sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Start time in seconds (original audio)
    pub start: f64,
    /// End time in seconds (original audio)
    pub end: f64,
    /// Raw similarity of the chosen window (0-100)
    pub score: f64,
    /// Where the next phrase of the same segment must start searching
    pub next_index: usize,
    /// Words claimed by this phrase, as indices into the searched sequence
    pub word_range: Range<usize>,
    pub quality: MatchQuality,
}

impl Alignment {
    fn malformed(search_start: usize) -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            score: 0.0,
            next_index: search_start,
            word_range: search_start..search_start,
            quality: MatchQuality::MalformedInput,
        }
    }

    /// The phrase claims everything from `search_start` to the end.
    ///
    /// With nothing left to claim it gets an empty range at the last word's end.
    fn remainder(words: &[Word], search_start: usize) -> Self {
        let last = words.len() - 1;
        let end = words[last].end;
        let start = words.get(search_start).map(|w| w.start).unwrap_or(end);
        Self {
            start,
            end,
            score: 0.0,
            next_index: words.len(),
            word_range: search_start.min(words.len())..words.len(),
            quality: MatchQuality::NoConfidentMatch,
        }
    }
}

/// Maps timing-free phrase texts onto word ranges
pub struct PhraseAligner {
    config: AlignerConfig,
    matcher: Box<dyn WindowMatcher>,
}

impl PhraseAligner {
    /// Build with the matcher named in the config
    pub fn new(config: &AlignerConfig) -> Self {
        Self::with_matcher(config, config.matcher.build(config))
    }

    pub fn with_matcher(config: &AlignerConfig, matcher: Box<dyn WindowMatcher>) -> Self {
        Self {
            config: config.clone(),
            matcher,
        }
    }

    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    /// Align `phrase_text` against `words[search_start..]` with the configured threshold
    pub fn align(&self, phrase_text: &str, words: &[Word], search_start: usize) -> Alignment {
        self.align_with_min_score(phrase_text, words, search_start, self.config.min_match_score)
    }

    /// Align `phrase_text` against `words[search_start..]`.
    ///
    /// Never fails: without a window scoring at least `min_score` the phrase
    /// claims every remaining word with score 0.
    pub fn align_with_min_score(
        &self,
        phrase_text: &str,
        words: &[Word],
        search_start: usize,
        min_score: f64,
    ) -> Alignment {
        let normalized: Vec<String> = words.iter().map(|w| normalize(w.display_text())).collect();
        self.align_normalized(phrase_text, words, &normalized, search_start, min_score)
    }

    fn align_normalized(
        &self,
        phrase_text: &str,
        words: &[Word],
        normalized: &[String],
        search_start: usize,
        min_score: f64,
    ) -> Alignment {
        if words.is_empty() {
            return Alignment::malformed(search_start);
        }
        let phrase = normalize(phrase_text);
        if phrase.is_empty() {
            return Alignment::malformed(search_start);
        }
        if search_start >= words.len() {
            return Alignment::remainder(words, search_start);
        }

        match self.matcher.best_window(&phrase, normalized, search_start) {
            Some(m) if m.score >= min_score && m.last < words.len() => Alignment {
                start: words[m.first].start,
                end: words[m.last].end,
                score: m.score,
                next_index: m.last + 1,
                word_range: m.first..m.last + 1,
                quality: MatchQuality::Confident,
            },
            _ => Alignment::remainder(words, search_start),
        }
    }

    /// Align every phrase of a segment in order, threading the cursor.
    ///
    /// Ranges come out non-overlapping and non-decreasing in start. Phrases
    /// that find the cursor already at the end are reported via
    /// `order_consistent = false`.
    pub fn align_segment(
        &self,
        segment: &Segment,
        all_words: &[Word],
        phrases: &[PhraseAnalysis],
    ) -> SegmentAlignment {
        let words = segment.words(all_words);

        if words.is_empty() {
            return interpolate(segment, phrases);
        }

        let normalized: Vec<String> = words.iter().map(|w| normalize(w.display_text())).collect();
        let offset = segment.word_range.start;
        let mut cursor = 0;
        let mut order_consistent = true;
        let mut aligned = Vec::with_capacity(phrases.len());

        for (i, phrase) in phrases.iter().enumerate() {
            if cursor >= words.len() && order_consistent {
                order_consistent = false;
                warn!(
                    "Segment {}: phrase {} ({:?}) has no words left to claim",
                    segment.index, i, phrase.text
                );
            }

            let mut a = self.align_normalized(
                &phrase.text,
                words,
                &normalized,
                cursor,
                self.config.min_match_score,
            );

            // Empty phrases sit at the cursor so starts stay non-decreasing
            if a.quality == MatchQuality::MalformedInput {
                let at = words
                    .get(cursor)
                    .map(|w| w.start)
                    .unwrap_or_else(|| segment.end);
                a.start = at;
                a.end = at;
            }

            if a.quality == MatchQuality::NoConfidentMatch && cursor < words.len() {
                warn!(
                    "Segment {}: no confident match for phrase {} ({:?}), claiming remaining words",
                    segment.index, i, phrase.text
                );
            }

            cursor = a.next_index;
            aligned.push(AlignedPhrase {
                text: phrase.text.clone(),
                start: a.start,
                end: a.end,
                match_score: a.score,
                word_range: offset + a.word_range.start..offset + a.word_range.end,
                quality: a.quality,
            });
        }

        let result = SegmentAlignment {
            segment_index: segment.index,
            phrases: aligned,
            order_consistent,
        };

        debug!(
            "Segment {}: {} phrases aligned with {} matcher, {} degraded",
            segment.index,
            result.phrases.len(),
            self.matcher.name(),
            result.degraded_count()
        );

        result
    }
}

/// Spread phrases evenly across a segment that has no words
fn interpolate(segment: &Segment, phrases: &[PhraseAnalysis]) -> SegmentAlignment {
    let n = phrases.len() as f64;
    let duration = segment.duration();
    let anchor = segment.word_range.start;

    let aligned = phrases
        .iter()
        .enumerate()
        .map(|(i, phrase)| AlignedPhrase {
            text: phrase.text.clone(),
            start: segment.start + duration * (i as f64 / n),
            end: segment.start + duration * ((i + 1) as f64 / n),
            match_score: 0.0,
            word_range: anchor..anchor,
            quality: MatchQuality::Interpolated,
        })
        .collect();

    SegmentAlignment {
        segment_index: segment.index,
        phrases: aligned,
        order_consistent: true,
    }
}
