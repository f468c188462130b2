use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{DeepgramResponse, Transcript, UtteranceHint, Word};

/// Transcript JSON as accepted on input
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptSource {
    /// Raw Deepgram response
    Deepgram(DeepgramResponse),
    /// Plain `{"words": [...], "utterances": [...]}`
    Plain {
        words: Vec<Word>,
        #[serde(default)]
        utterances: Vec<UtteranceHint>,
    },
}

/// Parse a transcript file into a validated Transcript
pub fn parse_transcript_file(path: &Path) -> Result<Transcript> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_transcript_json(&content).with_context(|| format!("Invalid transcript: {:?}", path))
}

/// Parse either a Deepgram response or a plain word list
pub fn parse_transcript_json(json: &str) -> Result<Transcript> {
    let source: TranscriptSource = serde_json::from_str(json)
        .context("Failed to parse transcript JSON (expected a Deepgram response or {\"words\": [...]})")?;

    let (words, utterances) = match source {
        TranscriptSource::Deepgram(response) => (
            response.words().iter().map(Word::from).collect(),
            response.utterance_hints(),
        ),
        TranscriptSource::Plain { words, utterances } => (words, utterances),
    };

    Ok(Transcript::new(words, utterances)?)
}
