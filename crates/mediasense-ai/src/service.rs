use async_trait::async_trait;
use mediasense_core::AppError;

/// Uniform entry point a coordinator drives.
///
/// Implementations are the only place [`AppError`] values are raised.
#[async_trait]
pub trait InferenceService: Send + Sync + 'static {
    /// Short name used in logs, e.g. `"image"`.
    const MODALITY: &'static str;

    type Input: Send + 'static;
    type Output: Clone + Send + Sync + 'static;

    async fn invoke(&self, input: Self::Input) -> Result<Self::Output, AppError>;
}
