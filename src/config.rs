use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which window matcher the aligner and vocabulary resolver use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Edit-distance similarity over every candidate window
    #[default]
    Fuzzy,
    /// Exact substring search only
    Exact,
}

/// Configuration for grouping words into segments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Hard cap on words per segment
    pub max_words: usize,
    /// Groups at or below this size are never emitted on their own
    pub min_fragment_words: usize,
    /// A long group may only be cut at punctuation once it has this many words
    pub split_min_words_before_punctuation: usize,
    /// Tolerance in seconds when assigning words to utterance hints
    pub hint_tolerance_s: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_words: 20,
            min_fragment_words: 3,
            split_min_words_before_punctuation: 8,
            hint_tolerance_s: 0.05,
        }
    }
}

/// Configuration for phrase alignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Minimum similarity (0-100) for a confident phrase match
    pub min_match_score: f64,
    /// Per-character bonus favoring fuller windows
    pub length_bonus: f64,
    pub matcher: MatcherKind,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            min_match_score: 70.0,
            length_bonus: 0.01,
            matcher: MatcherKind::Fuzzy,
        }
    }
}

/// Configuration for mapping original-audio time onto the slowed rendition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapConfig {
    /// Playback rate of the display audio (<1 is slower)
    pub speed_factor: f64,
    /// Seconds subtracted after scaling
    pub display_offset: f64,
    /// Floor applied to remapped end times
    pub min_display_end: f64,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            speed_factor: 0.75,
            display_offset: 0.3,
            min_display_end: 0.01,
        }
    }
}

/// Configuration for vocabulary timing resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    /// Minimum similarity (0-100) for a fuzzy lookup hit
    pub min_match_score: f64,
    /// Resolved windows shorter than this many seconds are discarded
    pub min_window_s: f64,
    /// Shortest token run used as a lookup key
    pub ngram_min: usize,
    /// Longest token run used as a lookup key
    pub ngram_max: usize,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            min_match_score: 90.0,
            min_window_s: 0.15,
            ngram_min: 1,
            ngram_max: 8,
        }
    }
}

/// Full configuration for a sync run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub segmenter: SegmenterConfig,
    pub aligner: AlignerConfig,
    pub remap: RemapConfig,
    pub vocab: VocabConfig,
}

impl SyncConfig {
    /// Load a (possibly partial) JSON config file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: SyncConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the stages cannot work with
    pub fn validate(&self) -> Result<(), ValidationError> {
        let speed = self.remap.speed_factor;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ValidationError::BadSpeedFactor(speed));
        }
        if self.vocab.ngram_min == 0 || self.vocab.ngram_min > self.vocab.ngram_max {
            return Err(ValidationError::BadNgramSpan {
                min: self.vocab.ngram_min,
                max: self.vocab.ngram_max,
            });
        }
        Ok(())
    }
}
