use crate::error::Result;

/// One entry of a classifier's raw output, before label normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPrediction {
    /// Label as named by the checkpoint, e.g. `"LABEL_2"` or `"positive"`.
    pub label: Option<String>,
    /// Confidence for `label`, in `[0.0, 1.0]` when present.
    pub score: Option<f32>,
}

impl RawPrediction {
    /// A prediction with both label and score.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: Some(label.into()),
            score: Some(score),
        }
    }
}

/// An inference backend that classifies one sentence.
///
/// Implementations own their tokenizer and weights. Construction is the expensive,
/// fallible step; [`predict`](Self::predict) runs once per request.
pub trait SentimentAnalysisModel {
    /// What to load, e.g. a repository id or a model size.
    type Options: std::fmt::Debug + Clone;

    /// Load the model onto `device`.
    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Best-first predictions for `text`. An empty vector means the model had no answer.
    fn predict(&self, text: &str) -> Result<Vec<RawPrediction>>;

    /// Device the model runs on.
    fn device(&self) -> &candle_core::Device;
}
