//! Image classification service.
//!
//! Owns one model handle, loaded lazily on first use (or eagerly through
//! [`ImageClassifier::warm_up`]). Loading happens exactly once: a failed load
//! is remembered and every later call reports `ModelLoadFailed`.
//! Decoding, loading and inference all run on the blocking pool.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;
use mediasense_core::{AppError, ImageClassificationResult};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::backend::{ImageBackend, ImageModel, Prediction};
use crate::service::InferenceService;

pub struct ImageClassifier {
    backend: Arc<dyn ImageBackend>,
    /// `None` once a load was attempted and failed.
    model: OnceCell<Option<Arc<dyn ImageModel>>>,
}

impl fmt::Debug for ImageClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageClassifier")
            .field("backend", &self.backend.name())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ImageClassifier {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            backend,
            model: OnceCell::new(),
        }
    }

    /// Load the model now instead of on the first request.
    pub async fn warm_up(&self) -> Result<(), AppError> {
        self.model().await.map(|_| ())
    }

    /// Whether a model handle is loaded and usable.
    pub fn is_loaded(&self) -> bool {
        matches!(self.model.get(), Some(Some(_)))
    }

    /// Classify an encoded image and return its top label.
    pub async fn classify(&self, bytes: &[u8]) -> Result<ImageClassificationResult, AppError> {
        self.top_label(bytes.to_vec()).await
    }

    /// Classify an encoded image and return up to `k` labels, best first.
    pub async fn classify_top_k(
        &self,
        bytes: &[u8],
        k: usize,
    ) -> Result<Vec<ImageClassificationResult>, AppError> {
        self.ranked(bytes.to_vec(), k).await
    }

    async fn top_label(&self, bytes: Vec<u8>) -> Result<ImageClassificationResult, AppError> {
        let mut ranked = self.ranked(bytes, 1).await?;
        // ranked never returns an empty list on success.
        ranked.pop().ok_or(AppError::NoPrediction)
    }

    async fn ranked(
        &self,
        bytes: Vec<u8>,
        k: usize,
    ) -> Result<Vec<ImageClassificationResult>, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput);
        }
        let image = tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(AppError::unknown)??;
        let model = self.model().await?;

        debug!(
            width = image.width(),
            height = image.height(),
            "running image inference"
        );
        let predictions = tokio::task::spawn_blocking(move || model.predict(&image))
            .await
            .map_err(AppError::unknown)?
            .map_err(|e| {
                warn!(error = %e, backend = self.backend.name(), "image inference failed");
                AppError::InferenceFailed
            })?;

        let ranked = rank(predictions, k.max(1));
        if ranked.is_empty() {
            return Err(AppError::NoPrediction);
        }
        debug!(label = %ranked[0].label(), confidence = ranked[0].confidence(), "classified image");
        Ok(ranked)
    }

    async fn model(&self) -> Result<Arc<dyn ImageModel>, AppError> {
        let slot = self
            .model
            .get_or_init(|| async {
                let backend = Arc::clone(&self.backend);
                let name = backend.name().to_string();
                match tokio::task::spawn_blocking(move || backend.load()).await {
                    Ok(Ok(model)) => {
                        info!(backend = %name, "loaded image model");
                        Some(model)
                    }
                    Ok(Err(e)) => {
                        warn!(backend = %name, error = %e, "image model failed to load");
                        None
                    }
                    Err(e) => {
                        warn!(backend = %name, error = %e, "image model loader aborted");
                        None
                    }
                }
            })
            .await;

        slot.clone().ok_or(AppError::ModelLoadFailed)
    }
}

#[async_trait]
impl InferenceService for ImageClassifier {
    const MODALITY: &'static str = "image";

    type Input = Vec<u8>;
    type Output = ImageClassificationResult;

    async fn invoke(&self, input: Vec<u8>) -> Result<ImageClassificationResult, AppError> {
        self.top_label(input).await
    }
}

/// Decode an encoded image into an RGB pixel buffer.
///
/// Empty input, unrecognized formats, corrupt data and zero-sized images are
/// all `InvalidInput`.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, AppError> {
    if bytes.is_empty() {
        return Err(AppError::InvalidInput);
    }
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        debug!(error = %e, len = bytes.len(), "image decode failed");
        AppError::InvalidInput
    })?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(AppError::InvalidInput);
    }
    Ok(decoded.to_rgb8())
}

/// Drop unusable scores, sort best first, keep `k`, clamp into `[0, 1]`.
fn rank(mut predictions: Vec<Prediction>, k: usize) -> Vec<ImageClassificationResult> {
    predictions.retain(|(_, score)| score.is_finite());
    // Stable sort: equal scores keep the backend's order.
    predictions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    predictions
        .into_iter()
        .take(k)
        .map(|(label, score)| {
            ImageClassificationResult::new(label, f64::from(score).clamp(0.0, 1.0))
        })
        .collect()
}
