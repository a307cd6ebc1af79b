use super::classifier::{Classifier, Readiness};
use super::labels::Sentiment;
use super::model::SentimentAnalysisModel;
use super::preprocess::normalize_text;
use crate::error::{Result, SentimentError};

// ============ Output types ============

/// A successful sentiment prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Normalized sentiment.
    pub sentiment: Sentiment,
    /// Confidence score (0.0 to 1.0), if the model reported one.
    pub score: Option<f32>,
    /// Label exactly as the model returned it.
    pub raw_label: String,
}

/// Result of analyzing one sentence.
///
/// Always carries the original input. Exactly one of [`sentiment`](Self::sentiment)
/// and [`error`](Self::error) is present.
#[derive(Debug)]
pub struct Analysis {
    /// Input text, as given (not normalized).
    pub text: String,
    /// Prediction or the reason there is none.
    pub prediction: Result<Prediction>,
}

impl Analysis {
    /// The sentiment, unless analysis failed.
    pub fn sentiment(&self) -> Option<&Sentiment> {
        self.prediction.as_ref().ok().map(|p| &p.sentiment)
    }

    /// Confidence, if analysis succeeded and the model reported one.
    pub fn score(&self) -> Option<f32> {
        self.prediction.as_ref().ok().and_then(|p| p.score)
    }

    /// Why analysis failed, if it did.
    pub fn error(&self) -> Option<&SentimentError> {
        self.prediction.as_ref().err()
    }

    /// Whether a sentiment was produced.
    pub fn is_ok(&self) -> bool {
        self.prediction.is_ok()
    }
}

// ============ Pipeline ============

/// Normalizes, classifies and packages sentences for display.
///
/// Construct with [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// # use vi_sentiment::sentiment::SentimentAnalysisPipelineBuilder;
/// let pipeline = SentimentAnalysisPipelineBuilder::phobert().build();
///
/// if !pipeline.initialize() {
///     eprintln!("model unavailable");
/// }
///
/// let analysis = pipeline.analyze("Hôm nay tôi rất vui");
/// match analysis.sentiment() {
///     Some(s) => println!("{s} ({:?})", analysis.score()),
///     None => println!("error: {}", analysis.error().unwrap()),
/// }
/// ```
pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) classifier: Classifier<M>,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Wrap an existing classifier.
    pub fn new(classifier: Classifier<M>) -> Self {
        Self { classifier }
    }

    /// Load the model now instead of on the first request. Returns readiness.
    pub fn initialize(&self) -> bool {
        self.classifier.initialize()
    }

    /// Whether the model is loaded and usable.
    pub fn is_ready(&self) -> bool {
        self.classifier.is_ready()
    }

    /// Current lifecycle state of the model.
    pub fn readiness(&self) -> Readiness {
        self.classifier.readiness()
    }

    /// Analyze one sentence. Never fails: errors are reported inside the [`Analysis`].
    ///
    /// A model that scores the text without naming a label yields `NEUTRAL`.
    pub fn analyze(&self, text: &str) -> Analysis {
        let normalized = normalize_text(text);

        let prediction = self.classifier.classify(&normalized).map(|c| Prediction {
            sentiment: if c.label.is_empty() {
                Sentiment::Neutral
            } else {
                Sentiment::from(c.label)
            },
            score: c.score,
            raw_label: c.raw_label,
        });

        match &prediction {
            Ok(p) => {
                tracing::debug!(sentiment = %p.sentiment, score = ?p.score, "sentence classified")
            }
            Err(e) => tracing::warn!(error = %e, "sentence classification failed"),
        }

        Analysis {
            text: text.to_string(),
            prediction,
        }
    }

    /// Returns the device (CPU/GPU) the model is running on, once loaded.
    pub fn device(&self) -> Option<candle_core::Device> {
        self.classifier.with_model(|m| m.device().clone())
    }

    /// The underlying classifier, for callers that normalize text themselves.
    pub fn classifier(&self) -> &Classifier<M> {
        &self.classifier
    }
}
