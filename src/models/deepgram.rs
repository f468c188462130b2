use serde::{Deserialize, Serialize};

use super::{UtteranceHint, Word};

/// Root response from Deepgram API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramResponse {
    pub results: DeepgramResults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramResults {
    pub channels: Vec<DeepgramChannel>,
    /// Present when the request asked for `utterances=true`
    #[serde(default)]
    pub utterances: Vec<DeepgramUtterance>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramChannel {
    pub alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramAlternative {
    pub words: Vec<DeepgramWord>,
    #[serde(default)]
    pub transcript: Option<String>,
}

/// A single word from Deepgram
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramWord {
    /// The recognized text
    pub word: String,
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// Transcription accuracy score (0-1)
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Punctuated form (smart_format / punctuate)
    #[serde(default)]
    pub punctuated_word: Option<String>,
}

/// A natural speech-pause boundary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramUtterance {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl DeepgramResponse {
    /// Extract all words from the first channel's first alternative
    pub fn words(&self) -> &[DeepgramWord] {
        self.results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.words.as_slice())
            .unwrap_or(&[])
    }

    /// Utterance boundaries as grouping hints
    pub fn utterance_hints(&self) -> Vec<UtteranceHint> {
        self.results
            .utterances
            .iter()
            .map(|u| UtteranceHint::new(u.start, u.end))
            .collect()
    }
}

impl From<&DeepgramWord> for Word {
    fn from(word: &DeepgramWord) -> Self {
        Word {
            text: word.word.clone(),
            punctuated: word.punctuated_word.clone(),
            start: word.start,
            end: word.end,
        }
    }
}
