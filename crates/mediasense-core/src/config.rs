//! Shared configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_IMAGE_INPUT_SIZE: u32 = 224;
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `model.onnx` and `labels.txt` for image classification.
    pub image_model_dir: Option<PathBuf>,
    /// Directory holding `model.onnx` and `tokenizer.json` for sentiment.
    /// When unset the built-in lexicon scorer is used.
    pub sentiment_model_dir: Option<PathBuf>,
    /// Square side length the image model expects.
    pub image_input_size: u32,
    /// Number of ranked labels shown alongside the top prediction.
    pub top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_model_dir: None,
            sentiment_model_dir: None,
            image_input_size: DEFAULT_IMAGE_INPUT_SIZE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Config {
    /// Read a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw)?;
        anyhow::ensure!(config.image_input_size > 0, "image_input_size must be > 0");
        Ok(config)
    }
}
