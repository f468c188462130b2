use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::error::ValidationError;
use crate::matching::TimeRemapper;
use crate::models::{
    AnalysisSet, PhraseAnalysis, Segment, SegmentAlignment, Transcript, VocabMap, Word,
};
use crate::stages::{segment, PhraseAligner, ResolveStats, VocabResolver};

/// Output of processing one segment
#[derive(Debug, Clone)]
pub struct SegmentOutput {
    pub alignment: SegmentAlignment,
    /// Vocabulary found in this segment only
    pub vocab: VocabMap,
    pub stats: ResolveStats,
}

/// Output of a full run over one recording
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub segments: Vec<Segment>,
    /// One alignment per segment, same order
    pub alignments: Vec<SegmentAlignment>,
    pub vocab: VocabMap,
    /// Vocabulary resolution counters summed over all segments
    pub stats: ResolveStats,
}

impl SyncResult {
    pub fn phrase_count(&self) -> usize {
        self.alignments.iter().map(|a| a.phrases.len()).sum()
    }

    /// Phrases not backed by a confident match
    pub fn degraded_count(&self) -> usize {
        self.alignments.iter().map(|a| a.degraded_count()).sum()
    }

    /// Segments whose phrases ran past the end of their words
    pub fn inconsistent_segments(&self) -> usize {
        self.alignments.iter().filter(|a| !a.order_consistent).count()
    }
}

/// Runs segmentation, phrase alignment and vocabulary resolution over a recording
#[derive(Debug, Clone)]
pub struct SyncPipeline {
    config: SyncConfig,
}

impl SyncPipeline {
    pub fn new(config: SyncConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn remapper(&self) -> TimeRemapper {
        TimeRemapper::new(&self.config.remap)
    }

    /// Group the transcript's words into segments
    pub fn segment(&self, transcript: &Transcript) -> Vec<Segment> {
        segment(&transcript.words, &transcript.utterances, &self.config.segmenter)
    }

    /// Align one segment's phrases and resolve their vocabulary into a private map
    pub fn process_segment(
        &self,
        segment: &Segment,
        all_words: &[Word],
        phrases: &[PhraseAnalysis],
    ) -> SegmentOutput {
        let aligner = PhraseAligner::new(&self.config.aligner);
        let mut resolver = VocabResolver::new(&self.config);

        let alignment = aligner.align_segment(segment, all_words, phrases);
        let mut vocab = VocabMap::new();
        let mut stats = ResolveStats::default();

        for (aligned, analysis) in alignment.phrases.iter().zip(phrases) {
            let s = resolver.resolve(aligned.words(all_words), aligned.start, analysis, &mut vocab);
            stats.absorb(&s);
        }

        debug!(
            "Segment {}: {} vocabulary items, {} timed",
            segment.index,
            vocab.len(),
            vocab.timed_count()
        );

        SegmentOutput {
            alignment,
            vocab,
            stats,
        }
    }

    /// Process every segment in order on the current thread
    pub fn run(&self, transcript: &Transcript, analyses: &AnalysisSet) -> SyncResult {
        let segments = self.segment(transcript);
        let mut alignments = Vec::with_capacity(segments.len());
        let mut vocab = VocabMap::new();
        let mut stats = ResolveStats::default();

        for seg in &segments {
            let phrases = analyses.phrases_for(seg.index, &seg.text);
            let output = self.process_segment(seg, &transcript.words, &phrases);
            alignments.push(output.alignment);
            vocab.merge(output.vocab);
            stats.absorb(&output.stats);
        }

        let result = SyncResult {
            segments,
            alignments,
            vocab,
            stats,
        };
        log_summary(&result);
        result
    }

    /// Process segments on blocking worker tasks.
    ///
    /// Each worker fills a private vocabulary map; the maps are reduced in
    /// segment order, so the result equals `run`.
    pub async fn run_concurrent(
        self: Arc<Self>,
        transcript: Arc<Transcript>,
        analyses: Arc<AnalysisSet>,
    ) -> Result<SyncResult> {
        let segments = self.segment(&transcript);
        info!("Processing {} segments concurrently", segments.len());

        let handles: Vec<_> = segments
            .iter()
            .cloned()
            .map(|seg| {
                let pipeline = Arc::clone(&self);
                let transcript = Arc::clone(&transcript);
                let analyses = Arc::clone(&analyses);
                tokio::task::spawn_blocking(move || {
                    let phrases = analyses.phrases_for(seg.index, &seg.text);
                    pipeline.process_segment(&seg, &transcript.words, &phrases)
                })
            })
            .collect();

        let mut alignments = Vec::with_capacity(segments.len());
        let mut vocab = VocabMap::new();
        let mut stats = ResolveStats::default();
        for (index, handle) in handles.into_iter().enumerate() {
            let output = handle
                .await
                .with_context(|| format!("Segment {} worker failed", index))?;
            alignments.push(output.alignment);
            vocab.merge(output.vocab);
            stats.absorb(&output.stats);
        }

        let result = SyncResult {
            segments,
            alignments,
            vocab,
            stats,
        };
        log_summary(&result);
        Ok(result)
    }
}

fn log_summary(result: &SyncResult) {
    info!(
        "Aligned {} phrases across {} segments ({} degraded, {} segments out of order)",
        result.phrase_count(),
        result.segments.len(),
        result.degraded_count(),
        result.inconsistent_segments()
    );
    info!(
        "Vocabulary: {} entries, {} with timing ({} items seen, {} short windows dropped)",
        result.vocab.len(),
        result.vocab.timed_count(),
        result.stats.candidates,
        result.stats.discarded_short
    );
}
