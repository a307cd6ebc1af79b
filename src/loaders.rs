use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use std::collections::HashMap;
use tokenizers::models::bpe::{Vocab, BPE};
use tokenizers::pre_tokenizers::whitespace::WhitespaceSplit;
use tokenizers::processors::roberta::RobertaProcessing;
use tokenizers::Tokenizer;

use crate::error::{Result, SentimentError};

/// Ids fairseq dictionaries reserve ahead of the entries in `vocab.txt`.
const FAIRSEQ_SPECIALS: [&str; 4] = ["<s>", "<pad>", "</s>", "<unk>"];
const UNK_ID: u32 = 3;
const END_OF_WORD: &str = "</w>";
const CONTINUATION: &str = "@@";

/// Tokenizer for a classifier checkpoint.
pub(crate) struct TextTokenizer {
    tokenizer: Tokenizer,
    /// Ids at or above this bound were added so BPE can merge through intermediate
    /// symbols. The checkpoint has no embedding for them.
    embedding_rows: Option<u32>,
}

impl TextTokenizer {
    /// `(input_ids, attention_mask)` for one sentence, special tokens included.
    pub fn encode(&self, text: &str) -> Result<(Vec<u32>, Vec<u32>)> {
        let encoding = self.tokenizer.encode(text, true).map_err(|e| {
            SentimentError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let ids = encoding
            .get_ids()
            .iter()
            .map(|&id| match self.embedding_rows {
                Some(rows) if id >= rows => UNK_ID,
                _ => id,
            })
            .collect();
        Ok((ids, encoding.get_attention_mask().to_vec()))
    }
}

impl From<Tokenizer> for TextTokenizer {
    fn from(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            embedding_rows: None,
        }
    }
}

/// Load `tokenizer.json`, or rebuild the tokenizer from fastBPE files (`vocab.txt` and
/// `bpe.codes`) for checkpoints that only ship a slow tokenizer, such as PhoBERT.
pub(crate) fn load_tokenizer(repo_id: &str) -> Result<TextTokenizer> {
    let api = Api::new()?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let missing = match repo.get("tokenizer.json") {
        Ok(tokenizer_path) => {
            let path_str = tokenizer_path.display().to_string();
            let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
                SentimentError::Tokenization(format!(
                    "Failed to load tokenizer from '{}': {}",
                    path_str, e
                ))
            })?;
            return Ok(tokenizer.into());
        }
        Err(e) => e,
    };

    let vocab_path = repo
        .get("vocab.txt")
        .map_err(|_| SentimentError::from(missing))?;
    let codes_path = repo.get("bpe.codes")?;
    tracing::debug!(repo_id, "no tokenizer.json, building BPE tokenizer from vocab.txt");

    fastbpe_tokenizer(
        &std::fs::read_to_string(vocab_path)?,
        &std::fs::read_to_string(codes_path)?,
    )
}

/// Build a tokenizer from a fairseq `vocab.txt` (`token count` per line, `@@` marking
/// non-final pieces) and fastBPE `bpe.codes` (`left right count` per line).
///
/// The vocabulary is rewritten into end-of-word form: `piece@@` becomes `piece` and a
/// final `piece` becomes `piece</w>`, which is how the merges name them.
pub(crate) fn fastbpe_tokenizer(vocab_txt: &str, bpe_codes: &str) -> Result<TextTokenizer> {
    let mut vocab = Vocab::default();
    for (id, token) in FAIRSEQ_SPECIALS.iter().enumerate() {
        vocab.insert(token.to_string(), id as u32);
    }

    let mut next_id = FAIRSEQ_SPECIALS.len() as u32;
    for line in vocab_txt.lines().filter(|l| !l.trim().is_empty()) {
        let token = line.rsplit_once(' ').map_or(line, |(token, _count)| token);
        let key = match token.strip_suffix(CONTINUATION) {
            Some(piece) => piece.to_string(),
            None => format!("{token}{END_OF_WORD}"),
        };
        vocab.entry(key).or_insert(next_id);
        next_id += 1;
    }
    let embedding_rows = next_id;

    let mut merges = Vec::new();
    for line in bpe_codes.lines() {
        if line.starts_with("#version") {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(left), Some(right)) = (parts.next(), parts.next()) else {
            continue;
        };
        for symbol in [left.to_string(), right.to_string(), format!("{left}{right}")] {
            vocab.entry(symbol).or_insert_with(|| {
                next_id += 1;
                next_id - 1
            });
        }
        merges.push((left.to_string(), right.to_string()));
    }

    let bpe = BPE::builder()
        .vocab_and_merges(vocab, merges)
        .unk_token(FAIRSEQ_SPECIALS[UNK_ID as usize].to_string())
        .end_of_word_suffix(END_OF_WORD.to_string())
        .build()
        .map_err(|e| {
            SentimentError::Tokenization(format!("Failed to build BPE tokenizer: {e}"))
        })?;

    let mut tokenizer = Tokenizer::new(bpe);
    tokenizer
        .with_pre_tokenizer(Some(WhitespaceSplit))
        .with_post_processor(Some(RobertaProcessing::new(
            (FAIRSEQ_SPECIALS[2].to_string(), 2),
            (FAIRSEQ_SPECIALS[0].to_string(), 0),
        )));

    Ok(TextTokenizer {
        tokenizer,
        embedding_rows: Some(embedding_rows),
    })
}

/// Everything needed to build a sequence classifier from a hub repository.
pub(crate) struct ClassifierCheckpoint {
    /// Raw `config.json`, parsed again by each architecture into its own config type.
    pub config_json: String,
    pub labels: LabelNames,
    pub weights: VarBuilder<'static>,
}

pub(crate) fn load_classifier_checkpoint(
    repo_id: &str,
    device: &Device,
) -> Result<ClassifierCheckpoint> {
    let api = Api::new()?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let config_path = repo.get("config.json")?;
    let weights_path = repo
        .get("model.safetensors")
        .or_else(|_| repo.get("pytorch_model.bin"))?;

    let config_json = std::fs::read_to_string(&config_path)?;
    let labels = LabelNames::from_config_json(&config_json)?;

    let weights = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(&weights_path, DType::F32, device)?
    };

    Ok(ClassifierCheckpoint {
        config_json,
        labels,
        weights,
    })
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
}

/// Class id → label name table from a checkpoint's `config.json`.
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelNames {
    names: HashMap<u32, String>,
    num_labels: usize,
}

impl LabelNames {
    pub fn from_config_json(config_json: &str) -> Result<Self> {
        let raw: ClassifierConfigJson = serde_json::from_str(config_json)?;
        let num_labels = raw.label2id.len().max(raw.id2label.len());

        let mut names = HashMap::with_capacity(raw.id2label.len());
        for (id, name) in raw.id2label {
            let id = id.parse::<u32>().map_err(|_| {
                SentimentError::Unexpected(format!(
                    "Invalid id2label key '{id}': expected unsigned integer"
                ))
            })?;
            names.insert(id, name);
        }

        Ok(Self { names, num_labels })
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Name for `id`, or the generic `LABEL_<id>` when the checkpoint does not name it.
    pub fn name(&self, id: u32) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_labels() {
        let labels = LabelNames::from_config_json(
            r#"{"id2label": {"0": "NEG", "1": "NEU", "2": "POS"}, "hidden_size": 768}"#,
        )
        .unwrap();
        assert_eq!(labels.num_labels(), 3);
        assert_eq!(labels.name(2), "POS");
    }

    #[test]
    fn unnamed_ids_fall_back_to_generic_names() {
        let labels =
            LabelNames::from_config_json(r#"{"label2id": {"a": 0, "b": 1, "c": 2}}"#).unwrap();
        assert_eq!(labels.num_labels(), 3);
        assert_eq!(labels.name(1), "LABEL_1");
    }

    const VOCAB: &str = "h@@ 9\ne@@ 8\nhe@@ 7\nllo 6\nl@@ 5\nlo 4\n";
    const CODES: &str = "h e 10\nl o</w> 9\nl lo</w> 8\n";

    #[test]
    fn fastbpe_merges_into_vocab_ids() {
        let tokenizer = fastbpe_tokenizer(VOCAB, CODES).unwrap();
        let (ids, mask) = tokenizer.encode("hello").unwrap();
        // <s> he@@ llo </s>
        assert_eq!(ids, vec![0, 6, 7, 2]);
        assert_eq!(mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn fastbpe_unknown_and_intermediate_symbols_are_unk() {
        let tokenizer = fastbpe_tokenizer(VOCAB, CODES).unwrap();
        // `o</w>` exists only as a merge input, `x` nowhere.
        let (ids, _) = tokenizer.encode("hello o x").unwrap();
        assert_eq!(ids, vec![0, 6, 7, UNK_ID, UNK_ID, 2]);
    }

    #[test]
    fn fastbpe_splits_on_whitespace_only() {
        let tokenizer = fastbpe_tokenizer(VOCAB, CODES).unwrap();
        let (ids, _) = tokenizer.encode("  hello\thello ").unwrap();
        assert_eq!(ids, vec![0, 6, 7, 6, 7, 2]);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = LabelNames::from_config_json(r#"{"id2label": {"zero": "NEG"}}"#).unwrap_err();
        assert!(matches!(err, SentimentError::Unexpected(_)));
    }
}
