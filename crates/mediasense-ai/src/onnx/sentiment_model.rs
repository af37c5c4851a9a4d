//! Binary sequence-classification sentiment model (e.g. DistilBERT SST-2).
//!
//! The model directory must contain `model.onnx` and `tokenizer.json`. Output
//! logits are `[1, 2]` in `[negative, positive]` order; the score is
//! `p(positive) - p(negative)`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::softmax;
use crate::backend::{BackendError, SentimentBackend, SentimentScorer};

const MAX_TOKENS: usize = 512;

/// Loads `model.onnx` + `tokenizer.json` from a directory on first use.
#[derive(Debug, Clone)]
pub struct OnnxSentimentBackend {
    model_dir: PathBuf,
}

impl OnnxSentimentBackend {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

impl SentimentBackend for OnnxSentimentBackend {
    fn name(&self) -> &str {
        "onnx-sentiment"
    }

    fn load(&self) -> Result<Arc<dyn SentimentScorer>, BackendError> {
        for file in ["model.onnx", "tokenizer.json"] {
            let path = self.model_dir.join(file);
            if !path.exists() {
                return Err(BackendError::ModelNotFound(path));
            }
        }
        let scorer = OnnxSentimentScorer::load(&self.model_dir)
            .map_err(|e| BackendError::Load(format!("{e:#}")))?;
        Ok(Arc::new(scorer))
    }
}

pub struct OnnxSentimentScorer {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// BERT-family models want `token_type_ids`; DistilBERT does not.
    wants_type_ids: bool,
}

impl OnnxSentimentScorer {
    /// Load a sentiment model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?
            .commit_from_file(&model_path)
            .context("create sentiment session")?;
        let wants_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        info!(model = %model_path.display(), wants_type_ids, "loaded sentiment model");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            wants_type_ids,
        })
    }
}

impl SentimentScorer for OnnxSentimentScorer {
    fn name(&self) -> &str {
        "onnx-sentiment"
    }

    fn score(&self, text: &str) -> Result<f64, BackendError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| BackendError::Inference(format!("tokenize: {e}")))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| i64::from(m))
            .collect();
        let type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| i64::from(t))
            .collect();
        if ids.is_empty() {
            return Err(BackendError::NoScore("tokenizer produced no tokens".into()));
        }

        let shape = [1, ids.len() as i64];
        let to_tensor = |data: Vec<i64>| {
            Tensor::from_array((shape, data.into_boxed_slice()))
                .map_err(|e| BackendError::Inference(e.to_string()))
        };
        let ids_tensor = to_tensor(ids)?;
        let mask_tensor = to_tensor(mask)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| BackendError::Inference("session lock poisoned".into()))?;
        let run = if self.wants_type_ids {
            let type_tensor = to_tensor(type_ids)?;
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])
        };
        let outputs = run.map_err(|e| BackendError::Inference(e.to_string()))?;

        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| BackendError::Inference(e.to_string()))?;
        if logits.len() != 2 {
            return Err(BackendError::NoScore(format!(
                "expected 2 logits, got {}",
                logits.len()
            )));
        }

        let p = softmax(logits);
        let score = f64::from(p[1] - p[0]);
        debug!(score, "sentiment model scored text");
        Ok(score)
    }
}
