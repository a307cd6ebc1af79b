use candle_core::Device;
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use std::collections::HashMap;

use crate::error::Result;
use crate::loaders::{load_classifier_checkpoint, load_tokenizer, LabelNames, TextTokenizer};
use crate::pipelines::sentiment::{RawPrediction, SentimentAnalysisModel};

/// Available ModernBERT model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    fn repo_id(self) -> &'static str {
        match self {
            ModernBertSize::Base => "clapAI/modernBERT-base-multilingual-sentiment",
            ModernBertSize::Large => "clapAI/modernBERT-large-multilingual-sentiment",
        }
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

/// Multilingual ModernBERT sentiment classifier (labels `positive`, `negative`, `neutral`).
pub struct SentimentModernBertModel {
    model: CandleModernBertForSequenceClassification,
    tokenizer: TextTokenizer,
    device: Device,
    labels: LabelNames,
}

impl SentimentModernBertModel {
    /// Download (or reuse the cached) checkpoint and load it onto `device`.
    pub fn new(size: ModernBertSize, device: Device) -> Result<Self> {
        let checkpoint = load_classifier_checkpoint(size.repo_id(), &device)?;

        let mut config: Config = serde_json::from_str(&checkpoint.config_json)?;
        patch_config_num_labels(&mut config, checkpoint.labels.num_labels());

        let model = CandleModernBertForSequenceClassification::load(checkpoint.weights, &config)?;
        let tokenizer = load_tokenizer(size.repo_id())?;

        Ok(Self {
            model,
            tokenizer,
            device,
            labels: checkpoint.labels,
        })
    }
}

impl SentimentAnalysisModel for SentimentModernBertModel {
    type Options = ModernBertSize;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SentimentModernBertModel::new(options, device)
    }

    fn predict(&self, text: &str) -> Result<Vec<RawPrediction>> {
        let (input_ids, attention_mask) = super::encode(&self.tokenizer, text, &self.device)?;
        let logits = self.model.forward(&input_ids, &attention_mask)?;
        Ok(vec![super::top_prediction(&logits, &self.labels)?])
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

// The classification head is sized from `classifier_config`, which some checkpoints omit.
fn patch_config_num_labels(config: &mut Config, num_labels: usize) {
    let current = config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0);
    if current == num_labels {
        return;
    }

    let id2label: HashMap<String, String> = (0..num_labels)
        .map(|i| (i.to_string(), format!("label_{i}")))
        .collect();
    let label2id: HashMap<String, String> = id2label
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();

    config.classifier_config = Some(ClassifierConfig {
        id2label,
        label2id,
        classifier_pooling: ClassifierPooling::default(),
    });
}
