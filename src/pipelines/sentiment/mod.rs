//! Vietnamese sentence sentiment analysis.
//!
//! Classify a sentence as `POSITIVE`, `NEGATIVE` or `NEUTRAL`.
//! Input is normalized first (lowercase, informal tokens accented, 50 characters max),
//! and the model's label is mapped onto that vocabulary.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vi_sentiment::sentiment::SentimentAnalysisPipelineBuilder;
//!
//! let pipeline = SentimentAnalysisPipelineBuilder::phobert().build();
//!
//! let analysis = pipeline.analyze("Hôm nay tôi rất vui");
//! if let Some(sentiment) = analysis.sentiment() {
//!     println!("{sentiment} (confidence: {:?})", analysis.score());
//! }
//! ```
//!
//! # Supported Models
//!
//! | Model | Builder Method |
//! |-------|----------------|
//! | PhoBERT / RoBERTa classifiers | [`SentimentAnalysisPipelineBuilder::phobert`], [`SentimentAnalysisPipelineBuilder::phobert_from`] |
//! | ModernBERT multilingual sentiment (`Base`, `Large`) | [`SentimentAnalysisPipelineBuilder::modernbert`] |
//!
//! Other backends plug in by implementing [`SentimentAnalysisModel`].

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod classifier;
pub(crate) mod labels;
pub(crate) mod model;
pub(crate) mod pipeline;
pub(crate) mod preprocess;

// ============ Public API ============

pub use crate::models::{ModernBertSize, PhoBertOptions, DEFAULT_PHOBERT_REPO};
pub use crate::pipelines::utils::DeviceRequest;
pub use builder::SentimentAnalysisPipelineBuilder;
pub use classifier::{Classification, Classifier, Readiness};
pub use labels::{normalize_label, Sentiment};
pub use model::{RawPrediction, SentimentAnalysisModel};
pub use pipeline::{Analysis, Prediction, SentimentAnalysisPipeline};
pub use preprocess::{normalize_text, MAX_INPUT_CHARS};

/// Only for generic annotations. Use [`SentimentAnalysisPipelineBuilder::phobert`].
pub type SentimentPhoBert = crate::models::phobert::PhoBertSentimentModel;

/// Only for generic annotations. Use [`SentimentAnalysisPipelineBuilder::modernbert`].
pub type SentimentModernBert = crate::models::modernbert::SentimentModernBertModel;
