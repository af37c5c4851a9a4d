use thiserror::Error;

/// User-facing failure kinds raised by the inference services.
///
/// The display text of each variant is what coordinators publish as their
/// error message, so it is written for end users rather than for logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("The ML model failed to load. Please restart the app.")]
    ModelLoadFailed,

    #[error("Invalid image format. Please choose a different image.")]
    InvalidInput,

    #[error("Could not classify the image. Try again with another one.")]
    InferenceFailed,

    #[error("Unable to get a valid prediction from the model.")]
    NoPrediction,

    #[error("Please enter text to analyze sentiment.")]
    EmptyInput,

    /// Anything the taxonomy does not cover. Keeps the cause's own message.
    #[error("{0}")]
    Unknown(anyhow::Error),
}

impl AppError {
    /// Wrap an unexpected failure, preserving its message for diagnostics.
    pub fn unknown(cause: impl Into<anyhow::Error>) -> Self {
        Self::Unknown(cause.into())
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelLoadFailed => "model_load_failed",
            Self::InvalidInput => "invalid_input",
            Self::InferenceFailed => "inference_failed",
            Self::NoPrediction => "no_prediction",
            Self::EmptyInput => "empty_input",
            Self::Unknown(_) => "unknown",
        }
    }
}
