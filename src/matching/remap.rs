use serde::{Deserialize, Serialize};

use crate::config::RemapConfig;
use crate::models::Word;

/// Map an original-audio time onto the speed-altered rendition
pub fn remap(t: f64, speed_factor: f64, offset: f64) -> f64 {
    (t / speed_factor - offset).max(0.0)
}

/// A word with display-domain timestamps, for playback highlighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Converts original-domain timestamps into display timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRemapper {
    speed_factor: f64,
    offset: f64,
    min_end: f64,
}

impl TimeRemapper {
    pub fn new(config: &RemapConfig) -> Self {
        Self {
            speed_factor: config.speed_factor,
            offset: config.display_offset,
            min_end: config.min_display_end,
        }
    }

    /// Unit speed, no offset
    pub fn identity() -> Self {
        Self {
            speed_factor: 1.0,
            offset: 0.0,
            min_end: 0.01,
        }
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// Display start, floored at 0
    pub fn start(&self, t: f64) -> f64 {
        remap(t, self.speed_factor, self.offset)
    }

    /// Display end, floored so highlight windows never collapse
    pub fn end(&self, t: f64) -> f64 {
        remap(t, self.speed_factor, self.offset).max(self.min_end)
    }

    /// Display start relative to a clip beginning at `origin` (original domain)
    pub fn clip_start(&self, t: f64, origin: f64) -> f64 {
        self.start(t - origin)
    }

    pub fn clip_end(&self, t: f64, origin: f64) -> f64 {
        self.end(t - origin)
    }

    /// Where a clip beginning at `origin` sits on the display timeline
    pub fn clip_origin(&self, origin: f64) -> f64 {
        origin / self.speed_factor
    }

    /// Every word on the recording-wide display timeline
    pub fn sync_words(&self, words: &[Word]) -> Vec<SyncWord> {
        words
            .iter()
            .map(|w| SyncWord {
                text: w.display_text().to_string(),
                start: self.start(w.start),
                end: self.end(w.end),
            })
            .collect()
    }

    /// Words lying fully inside `[phrase_start, phrase_end]`, relative to the phrase clip
    pub fn phrase_sync_words(
        &self,
        words: &[Word],
        phrase_start: f64,
        phrase_end: f64,
    ) -> Vec<SyncWord> {
        words
            .iter()
            .filter(|w| w.start >= phrase_start && w.end <= phrase_end)
            .map(|w| SyncWord {
                text: w.display_text().to_string(),
                start: self.clip_start(w.start, phrase_start),
                end: self.clip_end(w.end, phrase_start),
            })
            .collect()
    }
}

impl Default for TimeRemapper {
    fn default() -> Self {
        Self::new(&RemapConfig::default())
    }
}
