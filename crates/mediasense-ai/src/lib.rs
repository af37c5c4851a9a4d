//! Inference services: image classification and sentiment analysis.
//!
//! Services own their model backend and translate every backend failure into
//! [`AppError`](mediasense_core::AppError). Backends are plugged in through the
//! traits in [`backend`]; ONNX Runtime implementations live behind the `onnx`
//! feature.

pub mod backend;
mod image_classifier;
mod lexicon;
mod sentiment;
mod service;

#[cfg(feature = "onnx")]
mod onnx;

pub use backend::{
    BackendError, ImageBackend, ImageModel, Prediction, SentimentBackend, SentimentScorer,
};
pub use image_classifier::{ImageClassifier, decode_image};
pub use lexicon::LexiconScorer;
pub use sentiment::{SentimentAnalyzer, label_for_score};
pub use service::InferenceService;

#[cfg(feature = "onnx")]
pub use onnx::{OnnxImageBackend, OnnxSentimentBackend, OnnxSentimentScorer};
