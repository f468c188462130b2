use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single recognized word with original-audio timestamps in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Raw recognized text
    pub text: String,
    /// Punctuated form, when the recognizer produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punctuated: Option<String>,
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            punctuated: None,
            start,
            end,
        }
    }

    pub fn with_punctuation(mut self, punctuated: impl Into<String>) -> Self {
        self.punctuated = Some(punctuated.into());
        self
    }

    /// Displayed form: the punctuated text when present, the raw text otherwise
    pub fn display_text(&self) -> &str {
        self.punctuated.as_deref().unwrap_or(&self.text).trim()
    }

    /// Whether the displayed form contains any of `marks`
    pub fn contains_any(&self, marks: &[char]) -> bool {
        self.display_text().contains(marks)
    }

    /// Check the structural contract for a word at `index`
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ValidationError::NonFinite {
                index,
                text: self.text.clone(),
            });
        }
        if self.start < 0.0 {
            return Err(ValidationError::NegativeStart {
                index,
                text: self.text.clone(),
                start: self.start,
            });
        }
        if self.end < self.start {
            return Err(ValidationError::EndBeforeStart {
                index,
                text: self.text.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Utterance boundary reported by the recognizer, used as a grouping hint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtteranceHint {
    pub start: f64,
    pub end: f64,
}

impl UtteranceHint {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Validated word sequence for one recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    /// All words in order
    pub words: Vec<Word>,
    /// Optional utterance boundaries, in order
    #[serde(default)]
    pub utterances: Vec<UtteranceHint>,
}

impl Transcript {
    /// Build a transcript, rejecting words or hints that break the timing contract
    pub fn new(words: Vec<Word>, utterances: Vec<UtteranceHint>) -> Result<Self, ValidationError> {
        for (index, word) in words.iter().enumerate() {
            word.validate(index)?;
        }
        for (index, hint) in utterances.iter().enumerate() {
            if !hint.start.is_finite() || !hint.end.is_finite() || hint.end < hint.start {
                return Err(ValidationError::BadHint {
                    index,
                    start: hint.start,
                    end: hint.end,
                });
            }
        }
        Ok(Self { words, utterances })
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Total duration in seconds, first word start to last word end
    pub fn duration(&self) -> f64 {
        match (self.words.first(), self.words.last()) {
            (Some(first), Some(last)) => (last.end - first.start).max(0.0),
            _ => 0.0,
        }
    }
}
