use thiserror::Error;

/// Structural problems rejected when a transcript or configuration enters the system.
///
/// Alignment itself never fails; anything that reaches the stages has already
/// passed these checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("word {index} ({text:?}) has a non-finite timestamp")]
    NonFinite { index: usize, text: String },

    #[error("word {index} ({text:?}) starts before zero: {start}")]
    NegativeStart {
        index: usize,
        text: String,
        start: f64,
    },

    #[error("word {index} ({text:?}) ends at {end} before it starts at {start}")]
    EndBeforeStart {
        index: usize,
        text: String,
        start: f64,
        end: f64,
    },

    #[error("utterance hint {index} has an invalid range [{start}, {end}]")]
    BadHint { index: usize, start: f64, end: f64 },

    #[error("speed factor must be positive and finite, got {0}")]
    BadSpeedFactor(f64),

    #[error("vocabulary n-gram span {min}..={max} is empty or starts at zero")]
    BadNgramSpan { min: usize, max: usize },
}
