use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::Word;

/// Meaning recorded for items whose analysis was synthesized locally
pub const FALLBACK_MEANING: &str = "analysis unavailable";

/// A vocabulary item extracted from a phrase by external analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabCandidate {
    /// Surface form as it appears in the phrase
    #[serde(rename = "japanese")]
    pub surface: String,
    /// Kanji portion of the surface form; empty when it has none
    #[serde(default)]
    pub kanji: String,
    #[serde(default)]
    pub romaji: String,
    #[serde(default)]
    pub meaning: String,
}

impl VocabCandidate {
    /// Only items carrying kanji take part in vocabulary collection
    pub fn has_kanji(&self) -> bool {
        !self.kanji.is_empty()
    }
}

/// Reading of a single kanji in the context of its phrase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KanjiExplanation {
    pub kanji: String,
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub meaning: String,
}

/// One phrase of an external analysis; carries no timing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhraseAnalysis {
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub words: Vec<VocabCandidate>,
    #[serde(default)]
    pub kanji_explanations: Vec<KanjiExplanation>,
}

impl PhraseAnalysis {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Kanji-to-reading map built from explanations with both fields present
    pub fn kanji_readings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.kanji_explanations
            .iter()
            .filter(|k| !k.kanji.is_empty() && !k.reading.is_empty())
            .map(|k| (k.kanji.as_str(), k.reading.as_str()))
    }
}

/// Ordered phrase analysis for one segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    /// Index of the segment this analysis belongs to
    pub segment: usize,
    pub phrases: Vec<PhraseAnalysis>,
}

/// Analyses for a whole recording, keyed by segment index
#[derive(Debug, Clone, Default)]
pub struct AnalysisSet {
    by_segment: HashMap<usize, Vec<PhraseAnalysis>>,
}

impl AnalysisSet {
    pub fn new(analyses: Vec<SegmentAnalysis>) -> Self {
        let by_segment = analyses
            .into_iter()
            .map(|a| (a.segment, a.phrases))
            .collect();
        Self { by_segment }
    }

    pub fn len(&self) -> usize {
        self.by_segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_segment.is_empty()
    }

    /// Phrases for a segment, or a synthesized single-phrase analysis when none was supplied
    pub fn phrases_for(&self, segment_index: usize, segment_text: &str) -> Cow<'_, [PhraseAnalysis]> {
        match self.by_segment.get(&segment_index) {
            Some(phrases) if !phrases.is_empty() => Cow::Borrowed(phrases.as_slice()),
            _ => Cow::Owned(fallback_analysis(segment_text)),
        }
    }
}

/// Whether `c` is a CJK unified ideograph
pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Single-phrase analysis covering the whole segment text.
///
/// The sole vocabulary item carries every kanji in the text so the segment
/// still contributes to the vocabulary map.
pub fn fallback_analysis(segment_text: &str) -> Vec<PhraseAnalysis> {
    let kanji: Vec<char> = segment_text.chars().filter(|&c| is_kanji(c)).collect();

    vec![PhraseAnalysis {
        text: segment_text.to_string(),
        meaning: segment_text.to_string(),
        words: vec![VocabCandidate {
            surface: segment_text.to_string(),
            kanji: kanji.iter().collect(),
            romaji: String::new(),
            meaning: FALLBACK_MEANING.to_string(),
        }],
        kanji_explanations: kanji
            .iter()
            .map(|c| KanjiExplanation {
                kanji: c.to_string(),
                reading: String::new(),
                meaning: FALLBACK_MEANING.to_string(),
            })
            .collect(),
    }]
}

/// How an aligned phrase got its time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    /// Best window scored at or above the threshold
    Confident,
    /// No window cleared the threshold; the phrase claims the remaining words
    NoConfidentMatch,
    /// Empty phrase text or empty word range; times are zero
    MalformedInput,
    /// The segment had no words; the range is an even share of the segment
    Interpolated,
}

impl MatchQuality {
    /// Usable but not backed by a confident match
    pub fn is_degraded(self) -> bool {
        self != MatchQuality::Confident
    }
}

/// A phrase with its reconstructed time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPhrase {
    pub text: String,
    /// Start time in seconds (original audio)
    pub start: f64,
    /// End time in seconds (original audio)
    pub end: f64,
    /// Raw similarity of the chosen window (0-100)
    pub match_score: f64,
    /// Range into the recording's word array
    pub word_range: Range<usize>,
    pub quality: MatchQuality,
}

impl AlignedPhrase {
    /// The words this phrase covers
    pub fn words<'a>(&self, all_words: &'a [Word]) -> &'a [Word] {
        all_words.get(self.word_range.clone()).unwrap_or(&[])
    }
}

/// All aligned phrases of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAlignment {
    pub segment_index: usize,
    pub phrases: Vec<AlignedPhrase>,
    /// False when phrases remained after the cursor reached the end of the segment
    pub order_consistent: bool,
}

impl SegmentAlignment {
    pub fn degraded_count(&self) -> usize {
        self.phrases.iter().filter(|p| p.quality.is_degraded()).count()
    }
}
