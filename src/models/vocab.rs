use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PhraseAnalysis, VocabCandidate};

/// A resolved time window in display-domain seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// A vocabulary item collected across the recording, keyed by surface form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub surface: String,
    pub kanji: String,
    pub romaji: String,
    pub meaning: String,
    /// Reading of each kanji, from the phrase the entry came from
    #[serde(default)]
    pub kanji_readings: BTreeMap<String, String>,
    /// Display-domain start; absent when no confident window was found
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl VocabEntry {
    /// Build an entry for `candidate` as it appeared in `phrase`
    pub fn from_candidate(
        candidate: &VocabCandidate,
        phrase: &PhraseAnalysis,
        timing: Option<TimeWindow>,
    ) -> Self {
        Self {
            surface: candidate.surface.clone(),
            kanji: candidate.kanji.clone(),
            romaji: candidate.romaji.clone(),
            meaning: candidate.meaning.clone(),
            kanji_readings: phrase
                .kanji_readings()
                .map(|(k, r)| (k.to_string(), r.to_string()))
                .collect(),
            start: timing.map(|t| t.start),
            end: timing.map(|t| t.end),
        }
    }

    pub fn timing(&self) -> Option<TimeWindow> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        }
    }

    pub fn has_timing(&self) -> bool {
        self.timing().is_some()
    }
}

/// What recording an entry did to the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First occurrence of the surface form
    Inserted,
    /// Existing entry had no timing and the new one does
    TimingFilled,
    /// Existing entry left untouched
    Kept,
}

/// Decide how `incoming` combines with whatever is already stored.
///
/// The first occurrence to carry timing is authoritative; untimed occurrences
/// never replace anything.
pub fn merge_decision(existing: Option<&VocabEntry>, incoming: &VocabEntry) -> MergeOutcome {
    match existing {
        None => MergeOutcome::Inserted,
        Some(current) if !current.has_timing() && incoming.has_timing() => {
            MergeOutcome::TimingFilled
        }
        Some(_) => MergeOutcome::Kept,
    }
}

/// Vocabulary accumulated across a recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabMap {
    entries: BTreeMap<String, VocabEntry>,
}

impl VocabMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence, applying the "timing wins" rule
    pub fn record(&mut self, entry: VocabEntry) -> MergeOutcome {
        let outcome = merge_decision(self.entries.get(&entry.surface), &entry);
        if outcome != MergeOutcome::Kept {
            self.entries.insert(entry.surface.clone(), entry);
        }
        outcome
    }

    /// Fold a later map into this one with the same rule.
    ///
    /// Reducing worker maps in segment order gives the same result as
    /// recording every occurrence sequentially.
    pub fn merge(&mut self, other: VocabMap) {
        for (_, entry) in other.entries {
            self.record(entry);
        }
    }

    pub fn get(&self, surface: &str) -> Option<&VocabEntry> {
        self.entries.get(surface)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries carrying timing
    pub fn timed_count(&self) -> usize {
        self.entries.values().filter(|e| e.has_timing()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabEntry> {
        self.entries.values()
    }
}
