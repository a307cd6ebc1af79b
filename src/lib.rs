//! Vietnamese sentence sentiment classification with a persistent history.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). A sentence is normalized,
//! classified by a pretrained transformer as `POSITIVE`, `NEGATIVE` or `NEUTRAL`, and can
//! be appended to an on-disk [`history`].
//!
//! ```rust,no_run
//! use vi_sentiment::history::HistoryStore;
//! use vi_sentiment::sentiment::SentimentAnalysisPipelineBuilder;
//!
//! # fn main() -> vi_sentiment::error::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::phobert().build();
//! let store = HistoryStore::default();
//!
//! let analysis = pipeline.analyze("Hôm nay tôi rất vui");
//! if let Some(sentiment) = analysis.sentiment() {
//!     store.append(&analysis.text, sentiment)?;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;
pub mod history;

pub use pipelines::sentiment;
