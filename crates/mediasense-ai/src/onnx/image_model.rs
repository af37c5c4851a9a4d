//! ImageNet-style classifier (e.g. MobileNetV2) on ONNX Runtime.
//!
//! Input: `[1, 3, size, size]` float tensor, RGB, ImageNet mean/std
//! normalized. Output: `[1, classes]` logits. The model directory must
//! contain `model.onnx` and `labels.txt` (one label per line, in class order).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::RgbImage;
use image::imageops::{self, FilterType};
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info};

use super::softmax;
use crate::backend::{BackendError, ImageBackend, ImageModel, Prediction};

const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Loads `model.onnx` + `labels.txt` from a directory on first use.
#[derive(Debug, Clone)]
pub struct OnnxImageBackend {
    model_dir: PathBuf,
    input_size: u32,
}

impl OnnxImageBackend {
    pub fn new(model_dir: impl Into<PathBuf>, input_size: u32) -> Self {
        Self {
            model_dir: model_dir.into(),
            input_size,
        }
    }
}

impl ImageBackend for OnnxImageBackend {
    fn name(&self) -> &str {
        "onnx-image"
    }

    fn load(&self) -> Result<Arc<dyn ImageModel>, BackendError> {
        let model = OnnxImageModel::load(&self.model_dir, self.input_size)?;
        Ok(Arc::new(model))
    }
}

struct OnnxImageModel {
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
}

impl OnnxImageModel {
    fn load(model_dir: &Path, input_size: u32) -> Result<Self, BackendError> {
        let model_path = model_dir.join("model.onnx");
        let labels_path = model_dir.join("labels.txt");

        if !model_path.exists() {
            return Err(BackendError::ModelNotFound(model_path));
        }
        if !labels_path.exists() {
            return Err(BackendError::ModelNotFound(labels_path));
        }

        let session =
            build_session(&model_path).map_err(|e| BackendError::Load(format!("{e:#}")))?;

        let labels = read_labels(&labels_path)?;
        info!(
            model = %model_path.display(),
            classes = labels.len(),
            input_size,
            "loaded image model"
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size,
        })
    }

    /// Resize, normalize and lay out as CHW.
    fn preprocess(&self, image: &RgbImage) -> Vec<f32> {
        let size = self.input_size;
        let resized = imageops::resize(image, size, size, FilterType::Triangle);
        let plane = (size * size) as usize;
        let mut data = vec![0.0f32; 3 * plane];
        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                let v = f32::from(pixel.0[c]) / 255.0;
                data[c * plane + i] = (v - MEAN[c]) / STD[c];
            }
        }
        data
    }

    fn label(&self, class: usize) -> String {
        self.labels
            .get(class)
            .cloned()
            .unwrap_or_else(|| format!("class_{class}"))
    }
}

impl ImageModel for OnnxImageModel {
    fn predict(&self, image: &RgbImage) -> Result<Vec<Prediction>, BackendError> {
        let size = i64::from(self.input_size);
        let shape = [1, 3, size, size];
        let input = Tensor::from_array((shape, self.preprocess(image).into_boxed_slice()))
            .map_err(|e| BackendError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| BackendError::Inference("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| BackendError::Inference(e.to_string()))?;

        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| BackendError::Inference(e.to_string()))?;
        debug!(classes = logits.len(), "image model produced logits");

        let probabilities = softmax(logits);
        let mut ranked: Vec<Prediction> = probabilities
            .into_iter()
            .enumerate()
            .map(|(class, p)| (self.label(class), p))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }
}

fn build_session(model_path: &Path) -> anyhow::Result<Session> {
    Ok(Session::builder()?.commit_from_file(model_path)?)
}

fn read_labels(path: &Path) -> Result<Vec<String>, BackendError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(parse_labels(&raw))
}

fn parse_labels(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}
