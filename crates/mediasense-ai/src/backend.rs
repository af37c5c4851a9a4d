//! Model backend capability consumed by the services.
//!
//! A backend is anything that can load an image model and rank labels for a
//! pixel buffer, or score a text's polarity. The services treat it as a black
//! box and only look at whether it produced output.

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;

/// One ranked label and its raw score as reported by the model.
pub type Prediction = (String, f32);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("failed to load model: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("no score for input: {0}")]
    NoScore(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads an image classification model.
///
/// `load` runs at most once per service instance, on a blocking thread.
pub trait ImageBackend: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn load(&self) -> Result<Arc<dyn ImageModel>, BackendError>;
}

/// A loaded image model. Shared read-only across concurrent calls.
pub trait ImageModel: Send + Sync + 'static {
    /// Rank labels for a decoded image. An empty vector means the model ran
    /// but had nothing to say.
    fn predict(&self, image: &RgbImage) -> Result<Vec<Prediction>, BackendError>;
}

/// Loads a sentiment scorer.
///
/// Like [`ImageBackend::load`], this runs at most once per service instance,
/// on a blocking thread.
pub trait SentimentBackend: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn load(&self) -> Result<Arc<dyn SentimentScorer>, BackendError>;
}

/// Scores the overall polarity of a text in `[-1.0, 1.0]`.
pub trait SentimentScorer: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn score(&self, text: &str) -> Result<f64, BackendError>;
}
