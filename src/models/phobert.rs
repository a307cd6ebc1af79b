use candle_core::{Device, Tensor};
use candle_transformers::models::xlm_roberta::{
    Config, XLMRobertaForSequenceClassification as CandleRobertaForSequenceClassification,
};

use crate::error::{Result, SentimentError};
use crate::loaders::{load_classifier_checkpoint, load_tokenizer, LabelNames, TextTokenizer};
use crate::pipelines::sentiment::{RawPrediction, SentimentAnalysisModel};

/// PhoBERT checkpoint fine-tuned for Vietnamese sentiment.
pub const DEFAULT_PHOBERT_REPO: &str = "duchienmtp/PhoBERT-sentiment-analysis";

/// Where to load a RoBERTa-family sentiment classifier from.
///
/// The repository must provide `config.json` (with `id2label`), either `tokenizer.json` or
/// the fastBPE pair `vocab.txt` + `bpe.codes`, and `model.safetensors` or `pytorch_model.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoBertOptions {
    /// Hugging Face hub repository id.
    pub repo_id: String,
}

impl PhoBertOptions {
    /// Load from the given hub repository.
    pub fn new(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
        }
    }
}

impl Default for PhoBertOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PHOBERT_REPO)
    }
}

/// PhoBERT (RoBERTa architecture) with a sequence-classification head.
pub struct PhoBertSentimentModel {
    model: CandleRobertaForSequenceClassification,
    tokenizer: TextTokenizer,
    device: Device,
    labels: LabelNames,
}

impl PhoBertSentimentModel {
    /// Download (or reuse the cached) checkpoint and load it onto `device`.
    pub fn new(options: PhoBertOptions, device: Device) -> Result<Self> {
        let checkpoint = load_classifier_checkpoint(&options.repo_id, &device)?;
        if checkpoint.labels.num_labels() == 0 {
            return Err(SentimentError::Unexpected(format!(
                "'{}' config.json declares no labels; not a classification checkpoint",
                options.repo_id
            )));
        }

        let config: Config = serde_json::from_str(&checkpoint.config_json)?;
        let model = CandleRobertaForSequenceClassification::new(
            checkpoint.labels.num_labels(),
            &config,
            checkpoint.weights,
        )?;
        let tokenizer = load_tokenizer(&options.repo_id)?;

        Ok(Self {
            model,
            tokenizer,
            device,
            labels: checkpoint.labels,
        })
    }
}

impl SentimentAnalysisModel for PhoBertSentimentModel {
    type Options = PhoBertOptions;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        PhoBertSentimentModel::new(options, device)
    }

    fn predict(&self, text: &str) -> Result<Vec<RawPrediction>> {
        let (input_ids, attention_mask) = super::encode(&self.tokenizer, text, &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;
        Ok(vec![super::top_prediction(&logits, &self.labels)?])
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
