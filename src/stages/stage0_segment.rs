use std::ops::Range;

use tracing::{debug, info};

use crate::config::SegmenterConfig;
use crate::models::{Segment, UtteranceHint, Word};

/// Marks that end a sentence
pub const SENTENCE_END: [char; 3] = ['。', '？', '！'];

/// Marks a long group may be cut after
pub const CLAUSE_BREAK: [char; 4] = ['、', '。', '？', '！'];

/// Perform Stage 0: group words into sentence-scale segments
///
/// This stage:
/// 1. Groups words by utterance hints, or by sentence punctuation when there are none
/// 2. Carries tiny groups forward into the next group
/// 3. Splits groups over the word cap at clause punctuation or at the cap
/// 4. Emits one segment per final group
pub fn segment(words: &[Word], hints: &[UtteranceHint], config: &SegmenterConfig) -> Vec<Segment> {
    if words.is_empty() {
        return Vec::new();
    }

    let groups = if hints.is_empty() {
        groups_from_punctuation(words, config.max_words)
    } else {
        groups_from_hints(words, hints, config.hint_tolerance_s)
    };
    let initial = groups.len();

    let merged = merge_small_groups(groups, config.min_fragment_words);
    let merged_count = merged.len();

    let mut final_groups = Vec::with_capacity(merged.len());
    for group in merged {
        if group.len() <= config.max_words {
            final_groups.push(group);
        } else {
            final_groups.extend(split_long_group(words, group, config));
        }
    }

    debug!(
        "Stage 0: {} initial groups, {} after merge, {} after split",
        initial,
        merged_count,
        final_groups.len()
    );

    let segments: Vec<Segment> = final_groups
        .into_iter()
        .filter(|g| !g.is_empty())
        .enumerate()
        .map(|(index, range)| Segment::from_words(index, range, words))
        .collect();

    info!(
        "Stage 0: {} words -> {} segments ({})",
        words.len(),
        segments.len(),
        if hints.is_empty() { "punctuation" } else { "utterances" }
    );

    segments
}

/// Assign words to hint intervals by start time, scanning both in order.
///
/// A word that starts in a gap before the current hint joins that hint's
/// group, so no word is ever dropped. Words after the last hint form a
/// trailing group.
fn groups_from_hints(words: &[Word], hints: &[UtteranceHint], tolerance: f64) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut idx = 0;

    for hint in hints {
        let group_start = idx;
        while idx < words.len() && words[idx].start <= hint.end + tolerance {
            idx += 1;
        }
        if idx > group_start {
            groups.push(group_start..idx);
        }
    }

    if idx < words.len() {
        groups.push(idx..words.len());
    }

    groups
}

/// Split after sentence-ending punctuation, or every `max_words` words
fn groups_from_punctuation(words: &[Word], max_words: usize) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut group_start = 0;

    for (i, word) in words.iter().enumerate() {
        let len = i + 1 - group_start;
        if word.contains_any(&SENTENCE_END) || len >= max_words {
            groups.push(group_start..i + 1);
            group_start = i + 1;
        }
    }

    if group_start < words.len() {
        groups.push(group_start..words.len());
    }

    groups
}

/// Carry groups of `min_fragment` words or fewer into the next group.
///
/// A carry left over at the end is appended to the last emitted group, or
/// emitted alone if nothing was emitted.
fn merge_small_groups(groups: Vec<Range<usize>>, min_fragment: usize) -> Vec<Range<usize>> {
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(groups.len());
    let mut carry: Option<Range<usize>> = None;

    for group in groups {
        let combined = match carry.take() {
            Some(c) => c.start..group.end,
            None => group,
        };
        if combined.len() <= min_fragment {
            carry = Some(combined);
        } else {
            merged.push(combined);
        }
    }

    if let Some(rest) = carry {
        match merged.last_mut() {
            Some(last) => last.end = rest.end,
            None => merged.push(rest),
        }
    }

    merged
}

/// Cut a group that exceeds the word cap.
///
/// Once a part has enough words it ends after the next clause mark; otherwise
/// it is hard-cut at the cap. A tiny tail folds into the previous part.
fn split_long_group(words: &[Word], group: Range<usize>, config: &SegmenterConfig) -> Vec<Range<usize>> {
    let mut parts: Vec<Range<usize>> = Vec::new();
    let mut part_start = group.start;

    for i in group.clone() {
        let len = i + 1 - part_start;
        let at_clause = words[i].contains_any(&CLAUSE_BREAK);
        if (at_clause && len >= config.split_min_words_before_punctuation) || len >= config.max_words {
            parts.push(part_start..i + 1);
            part_start = i + 1;
        }
    }

    if part_start < group.end {
        let tail = part_start..group.end;
        match parts.last_mut() {
            Some(last) if tail.len() <= config.min_fragment_words => last.end = tail.end,
            _ => parts.push(tail),
        }
    }

    parts
}
