use std::collections::HashMap;

use tracing::debug;

use crate::config::{SyncConfig, VocabConfig};
use crate::matching::{normalize_for_alignment, NormalizeCache, TimeRemapper, WindowMatcher};
use crate::models::{MergeOutcome, PhraseAnalysis, TimeWindow, VocabEntry, VocabMap, Word};

/// Display-domain windows for every n-gram of a phrase's words
#[derive(Debug, Default)]
pub struct WindowLookup {
    /// Keys in first-seen order, for fuzzy scanning
    keys: Vec<String>,
    windows: HashMap<String, TimeWindow>,
}

impl WindowLookup {
    /// Index every run of `ngram_min..=ngram_max` consecutive words.
    ///
    /// Times are remapped relative to the phrase clip, then placed on the
    /// recording-wide display timeline. A later run with the same key
    /// replaces the earlier window.
    pub fn build(
        words: &[Word],
        phrase_origin: f64,
        remapper: &TimeRemapper,
        config: &VocabConfig,
    ) -> Self {
        let mut lookup = Self::default();
        let n = words.len();
        let shift = remapper.clip_origin(phrase_origin);

        for span in config.ngram_min..=config.ngram_max.min(n) {
            for run in words.windows(span) {
                let text: String = run.iter().map(|w| w.display_text()).collect();
                let key = normalize_for_alignment(&text);
                if key.is_empty() {
                    continue;
                }

                let window = TimeWindow::new(
                    remapper.clip_start(run[0].start, phrase_origin) + shift,
                    remapper.clip_end(run[span - 1].end, phrase_origin) + shift,
                );
                if lookup.windows.insert(key.clone(), window).is_none() {
                    lookup.keys.push(key);
                }
            }
        }

        lookup
    }

    pub fn exact(&self, key: &str) -> Option<TimeWindow> {
        self.windows.get(key).copied()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Counters from resolving one phrase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Kanji-bearing items considered
    pub candidates: usize,
    /// Items that ended up with a window
    pub timed: usize,
    /// Windows dropped for being too short
    pub discarded_short: usize,
    pub inserted: usize,
    pub timing_filled: usize,
}

impl ResolveStats {
    /// Add another set of counters into this one
    pub fn absorb(&mut self, other: &ResolveStats) {
        self.candidates += other.candidates;
        self.timed += other.timed;
        self.discarded_short += other.discarded_short;
        self.inserted += other.inserted;
        self.timing_filled += other.timing_filled;
    }
}

/// Resolves timing windows for extracted vocabulary items
pub struct VocabResolver {
    config: VocabConfig,
    remapper: TimeRemapper,
    matcher: Box<dyn WindowMatcher>,
    surfaces: NormalizeCache,
}

impl VocabResolver {
    pub fn new(config: &SyncConfig) -> Self {
        Self::with_parts(
            &config.vocab,
            TimeRemapper::new(&config.remap),
            config.aligner.matcher.build(&config.aligner),
        )
    }

    pub fn with_parts(
        config: &VocabConfig,
        remapper: TimeRemapper,
        matcher: Box<dyn WindowMatcher>,
    ) -> Self {
        Self {
            config: config.clone(),
            remapper,
            matcher,
            surfaces: NormalizeCache::new(),
        }
    }

    /// Resolve every kanji-bearing item of `analysis` against the phrase's words
    /// and record the results in `vocab`.
    ///
    /// `phrase_origin` is the phrase's original-domain start.
    pub fn resolve(
        &mut self,
        phrase_words: &[Word],
        phrase_origin: f64,
        analysis: &PhraseAnalysis,
        vocab: &mut VocabMap,
    ) -> ResolveStats {
        let lookup = WindowLookup::build(phrase_words, phrase_origin, &self.remapper, &self.config);
        let mut stats = ResolveStats::default();

        for candidate in analysis.words.iter().filter(|w| w.has_kanji()) {
            if candidate.surface.is_empty() {
                continue;
            }
            stats.candidates += 1;

            let mut timing = self.find_window(&candidate.surface, &lookup);
            if timing.is_some_and(|t| t.width() < self.config.min_window_s) {
                stats.discarded_short += 1;
                timing = None;
            }
            if timing.is_some() {
                stats.timed += 1;
            }

            match vocab.record(VocabEntry::from_candidate(candidate, analysis, timing)) {
                MergeOutcome::Inserted => stats.inserted += 1,
                MergeOutcome::TimingFilled => stats.timing_filled += 1,
                MergeOutcome::Kept => {}
            }
        }

        debug!(
            "Phrase {:?}: {} lookup keys, {}/{} items timed, {} short windows dropped",
            analysis.text,
            lookup.len(),
            stats.timed,
            stats.candidates,
            stats.discarded_short
        );

        stats
    }

    /// Exact key first, then the closest key if it scores high enough
    pub fn find_window(&mut self, surface: &str, lookup: &WindowLookup) -> Option<TimeWindow> {
        let key = self.surfaces.get(surface);
        if key.is_empty() {
            return None;
        }
        if let Some(window) = lookup.exact(key) {
            return Some(window);
        }

        match self.matcher.closest(key, lookup.keys()) {
            Some((hit, score)) if score >= self.config.min_match_score => lookup.exact(hit),
            _ => None,
        }
    }
}
