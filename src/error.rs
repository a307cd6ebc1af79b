//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`SentimentError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`SentimentError`] as the error type.
pub type Result<T> = std::result::Result<T, SentimentError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust
/// use vi_sentiment::error::SentimentError;
///
/// fn describe(e: &SentimentError) -> &'static str {
///     match e {
///         SentimentError::Initialization(_) => "model unavailable, show a warning",
///         SentimentError::NoResult | SentimentError::MalformedLabel(_) => "retry this sentence",
///         SentimentError::Storage(_) => "classified but not saved",
///         _ => "classification failed",
///     }
/// }
///
/// assert_eq!(describe(&SentimentError::NoResult), "retry this sentence");
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentimentError {
    /// The model, tokenizer or device could not be acquired.
    /// Every classification fails with this until the process is restarted.
    #[error("classifier unavailable: {0}")]
    Initialization(String),

    /// The model produced an empty result set for a valid input.
    #[error("model returned no results")]
    NoResult,

    /// The model produced neither a label nor a score.
    #[error("malformed model output: {0}")]
    MalformedLabel(String),

    /// The history database could not be opened, written or read.
    #[error("history store error: {0}")]
    Storage(String),

    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenization failure. Check input text.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for SentimentError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        SentimentError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for SentimentError {
    fn from(value: candle_core::Error) -> Self {
        SentimentError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for SentimentError {
    fn from(value: std::io::Error) -> Self {
        SentimentError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for SentimentError {
    fn from(value: serde_json::Error) -> Self {
        SentimentError::Unexpected(value.to_string())
    }
}

impl From<rusqlite::Error> for SentimentError {
    fn from(value: rusqlite::Error) -> Self {
        SentimentError::Storage(value.to_string())
    }
}
