pub(crate) mod modernbert;
pub(crate) mod phobert;

pub use modernbert::ModernBertSize;
pub use phobert::{PhoBertOptions, DEFAULT_PHOBERT_REPO};

use candle_core::{Device, Tensor, D};
use candle_nn::ops::softmax;

use crate::error::Result;
use crate::loaders::{LabelNames, TextTokenizer};
use crate::pipelines::sentiment::RawPrediction;

/// Tokenize one sentence into `(input_ids, attention_mask)`, each shaped `(1, seq_len)`.
pub(crate) fn encode(
    tokenizer: &TextTokenizer,
    text: &str,
    device: &Device,
) -> Result<(Tensor, Tensor)> {
    let (ids, mask) = tokenizer.encode(text)?;
    let input_ids = Tensor::new(ids.as_slice(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(mask.as_slice(), device)?.unsqueeze(0)?;
    Ok((input_ids, attention_mask))
}

/// Turn `(1, num_labels)` logits into the single best prediction.
pub(crate) fn top_prediction(logits: &Tensor, labels: &LabelNames) -> Result<RawPrediction> {
    let pred_id = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;

    let probs = softmax(logits, D::Minus1)?;
    let probs_vec = probs.squeeze(0)?.to_vec1::<f32>()?;
    let score = probs_vec.get(pred_id as usize).copied();

    Ok(RawPrediction {
        label: Some(labels.name(pred_id)),
        score,
    })
}
