use super::classifier::Classifier;
use super::model::SentimentAnalysisModel;
use super::pipeline::SentimentAnalysisPipeline;
use crate::models::{ModernBertSize, PhoBertOptions};
use crate::pipelines::utils::DeviceRequest;

/// Builder for creating [`SentimentAnalysisPipeline`] instances.
///
/// Use [`Self::phobert`] or [`Self::modernbert`] as the entry point.
/// Building is cheap; the model loads on [`SentimentAnalysisPipeline::initialize`]
/// or on the first analysis.
///
/// # Examples
///
/// ```rust,no_run
/// # use vi_sentiment::sentiment::SentimentAnalysisPipelineBuilder;
/// let pipeline = SentimentAnalysisPipelineBuilder::phobert()
///     .cuda(0)
///     .build();
/// ```
pub struct SentimentAnalysisPipelineBuilder<M: SentimentAnalysisModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipelineBuilder<M> {
    /// Start from backend-specific options.
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::default(),
        }
    }

    /// Use CPU for inference.
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Prefer an accelerator when one is available (default).
    pub fn auto_device(mut self) -> Self {
        self.device_request = DeviceRequest::Auto;
        self
    }

    /// Builds the pipeline with configured settings. Nothing is loaded yet.
    pub fn build(self) -> SentimentAnalysisPipeline<M> {
        SentimentAnalysisPipeline::new(Classifier::new(self.options, self.device_request))
    }
}

impl SentimentAnalysisPipelineBuilder<super::SentimentPhoBert> {
    /// PhoBERT fine-tuned for Vietnamese sentiment (`duchienmtp/PhoBERT-sentiment-analysis`).
    pub fn phobert() -> Self {
        Self::new(PhoBertOptions::default())
    }

    /// A RoBERTa-family sentiment checkpoint from another hub repository.
    pub fn phobert_from(repo_id: impl Into<String>) -> Self {
        Self::new(PhoBertOptions::new(repo_id))
    }
}

impl SentimentAnalysisPipelineBuilder<super::SentimentModernBert> {
    /// Multilingual ModernBERT sentiment model.
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self::new(size)
    }
}
