use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::MatcherKind;
use crate::matching::{SyncWord, TimeRemapper};
use crate::models::{context_before, MatchQuality, Segment, VocabMap, Word};
use crate::pipeline::SyncResult;

/// One segment as handed to external phrase analysis
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRequest {
    pub index: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub word_count: usize,
    /// Text of the preceding segments, for disambiguation only
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context: String,
}

impl SegmentRequest {
    /// Build requests for every segment with up to `context_count` preceding segments as context
    pub fn from_segments(segments: &[Segment], context_count: usize) -> Vec<Self> {
        segments
            .iter()
            .map(|s| SegmentRequest {
                index: s.index,
                text: s.text.clone(),
                start: s.start,
                end: s.end,
                word_count: s.word_count(),
                context: context_before(segments, s.index, context_count),
            })
            .collect()
    }
}

/// Write segment requests as a JSON array
pub fn write_segment_requests(requests: &[SegmentRequest], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, requests).context("Failed to write JSON")?;
    Ok(())
}

/// Machine-readable output format
#[derive(Debug, Clone, Serialize)]
pub struct MachineOutput {
    pub segments: Vec<MachineSegment>,
    /// Vocabulary keyed by surface form; times are display-domain
    pub vocabulary: VocabMap,
    /// Every word on the display timeline
    pub sync_words: Vec<SyncWord>,
    pub metadata: SyncMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineSegment {
    pub index: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub display_start: f64,
    pub display_end: f64,
    pub order_consistent: bool,
    pub phrases: Vec<MachinePhrase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachinePhrase {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub display_start: f64,
    pub display_end: f64,
    pub match_score: f64,
    pub quality: MatchQuality,
    pub needs_review: bool,
    /// Words inside the phrase, relative to the phrase clip
    pub words: Vec<SyncWord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncMetadata {
    pub total_words: usize,
    pub total_segments: usize,
    pub total_phrases: usize,
    pub degraded_phrases: usize,
    pub vocabulary_entries: usize,
    pub timed_vocabulary: usize,
    pub duration_s: f64,
    pub speed_factor: f64,
    pub matcher: MatcherKind,
}

impl SyncMetadata {
    pub fn from_result(
        result: &SyncResult,
        words: &[Word],
        remapper: &TimeRemapper,
        matcher: MatcherKind,
    ) -> Self {
        let duration_s = match (words.first(), words.last()) {
            (Some(first), Some(last)) => (last.end - first.start).max(0.0),
            _ => 0.0,
        };
        Self {
            total_words: words.len(),
            total_segments: result.segments.len(),
            total_phrases: result.phrase_count(),
            degraded_phrases: result.degraded_count(),
            vocabulary_entries: result.vocab.len(),
            timed_vocabulary: result.vocab.timed_count(),
            duration_s,
            speed_factor: remapper.speed_factor(),
            matcher,
        }
    }
}

impl MachineOutput {
    pub fn from_result(
        result: &SyncResult,
        words: &[Word],
        remapper: &TimeRemapper,
        metadata: SyncMetadata,
    ) -> Self {
        let segments = result
            .segments
            .iter()
            .zip(&result.alignments)
            .map(|(segment, alignment)| MachineSegment {
                index: segment.index,
                text: segment.text.clone(),
                start: segment.start,
                end: segment.end,
                display_start: remapper.start(segment.start),
                display_end: remapper.end(segment.end),
                order_consistent: alignment.order_consistent,
                phrases: alignment
                    .phrases
                    .iter()
                    .map(|p| MachinePhrase {
                        text: p.text.clone(),
                        start: p.start,
                        end: p.end,
                        display_start: remapper.start(p.start),
                        display_end: remapper.end(p.end),
                        match_score: p.match_score,
                        quality: p.quality,
                        needs_review: p.quality.is_degraded(),
                        words: remapper.phrase_sync_words(p.words(words), p.start, p.end),
                    })
                    .collect(),
            })
            .collect();

        Self {
            segments,
            vocabulary: result.vocab.clone(),
            sync_words: remapper.sync_words(words),
            metadata,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable review report
pub struct HumanReport<'a> {
    result: &'a SyncResult,
}

impl<'a> HumanReport<'a> {
    pub fn new(result: &'a SyncResult) -> Self {
        Self { result }
    }

    /// Segments with their phrases, then the vocabulary
    pub fn format(&self) -> String {
        let mut output = String::new();

        for (segment, alignment) in self.result.segments.iter().zip(&self.result.alignments) {
            let _ = writeln!(
                output,
                "[{}] Segment {}: {}",
                format_timestamp(seconds_to_ms(segment.start)),
                segment.index,
                segment.text
            );
            for phrase in &alignment.phrases {
                let _ = write!(
                    output,
                    "  [{}] {}",
                    format_timestamp(seconds_to_ms(phrase.start)),
                    phrase.text
                );
                if phrase.quality.is_degraded() {
                    output.push_str(" (review)");
                }
                output.push('\n');
            }
            output.push('\n');
        }

        output.push_str("Vocabulary\n----------\n");
        for entry in self.result.vocab.iter() {
            let _ = write!(output, "{}", entry.surface);
            if !entry.romaji.is_empty() {
                let _ = write!(output, " ({})", entry.romaji);
            }
            if !entry.meaning.is_empty() {
                let _ = write!(output, " - {}", entry.meaning);
            }
            match entry.timing() {
                Some(t) => {
                    let _ = writeln!(output, " @ {}", format_timestamp(seconds_to_ms(t.start)));
                }
                None => output.push_str(" @ --\n"),
            }
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Format milliseconds as MM:SS.mmm
fn format_timestamp(ms: u64) -> String {
    let seconds = ms / 1000;
    let millis = ms % 1000;
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}.{:03}", minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlignedPhrase, SegmentAlignment, VocabEntry};

    fn result() -> (SyncResult, Vec<Word>) {
        let words = vec![
            Word::new("日本語", 0.1, 0.6),
            Word::new("です", 0.6, 0.9).with_punctuation("です。"),
            Word::new("はい", 61.0, 61.5),
            Word::new("そう", 61.5, 62.0),
        ];
        let segments = vec![
            Segment::from_words(0, 0..2, &words),
            Segment::from_words(1, 2..4, &words),
        ];
        let alignments = vec![
            SegmentAlignment {
                segment_index: 0,
                phrases: vec![AlignedPhrase {
                    text: "日本語です".to_string(),
                    start: 0.1,
                    end: 0.9,
                    match_score: 100.0,
                    word_range: 0..2,
                    quality: MatchQuality::Confident,
                }],
                order_consistent: true,
            },
            SegmentAlignment {
                segment_index: 1,
                phrases: vec![AlignedPhrase {
                    text: "違う".to_string(),
                    start: 61.0,
                    end: 62.0,
                    match_score: 0.0,
                    word_range: 2..4,
                    quality: MatchQuality::NoConfidentMatch,
                }],
                order_consistent: true,
            },
        ];
        let mut vocab = VocabMap::new();
        vocab.record(VocabEntry {
            surface: "日本語".to_string(),
            kanji: "日本語".to_string(),
            romaji: "nihongo".to_string(),
            meaning: "Japanese".to_string(),
            kanji_readings: Default::default(),
            start: Some(0.0),
            end: Some(0.5),
        });

        (
            SyncResult {
                segments,
                alignments,
                vocab,
                stats: Default::default(),
            },
            words,
        )
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00.000");
        assert_eq!(format_timestamp(1500), "00:01.500");
        assert_eq!(format_timestamp(65_000), "01:05.000");
        assert_eq!(format_timestamp(3_661_500), "61:01.500");
        assert_eq!(format_timestamp(seconds_to_ms(61.0)), "01:01.000");
    }

    #[test]
    fn test_segment_requests_carry_context() {
        let (result, _) = result();
        let requests = SegmentRequest::from_segments(&result.segments, 2);

        assert_eq!(requests[0].context, "");
        assert_eq!(requests[1].context, "日本語です。");
        assert_eq!(requests[1].word_count, 2);
    }

    #[test]
    fn test_machine_output_flags_degraded_phrases() {
        let (result, words) = result();
        let remapper = TimeRemapper::identity();
        let metadata = SyncMetadata::from_result(&result, &words, &remapper, MatcherKind::Fuzzy);
        let output = MachineOutput::from_result(&result, &words, &remapper, metadata);

        assert!(!output.segments[0].phrases[0].needs_review);
        assert!(output.segments[1].phrases[0].needs_review);
        assert_eq!(output.segments[0].phrases[0].words.len(), 2);
        assert_eq!(output.sync_words.len(), 4);
        assert_eq!(output.metadata.degraded_phrases, 1);
        assert_eq!(output.metadata.timed_vocabulary, 1);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["segments"][1]["phrases"][0]["quality"], "no_confident_match");
        assert_eq!(json["vocabulary"]["日本語"]["romaji"], "nihongo");
        assert_eq!(json["metadata"]["matcher"], "fuzzy");
    }

    #[test]
    fn test_human_report() {
        let (result, _) = result();
        let text = HumanReport::new(&result).format();

        assert!(text.contains("[00:00.100] Segment 0: 日本語です。"));
        assert!(text.contains("  [01:01.000] 違う (review)"));
        assert!(!text.contains("日本語です (review)"));
        assert!(text.contains("日本語 (nihongo) - Japanese @ 00:00.000"));
    }
}
