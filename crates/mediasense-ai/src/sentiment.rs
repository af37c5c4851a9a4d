//! Sentiment analysis service.
//!
//! Validates text, asks the scorer for a whole-text polarity in `[-1, 1]`, and
//! maps it onto a label. The confidence is the score's magnitude, which is a
//! strength heuristic and not a calibrated probability.
//!
//! The scorer is either handed over ready to use or loaded lazily from a
//! [`SentimentBackend`] on first use. A failed load is remembered and every
//! later call reports `ModelLoadFailed`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mediasense_core::{AppError, Sentiment, SentimentResult};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, SentimentBackend, SentimentScorer};
use crate::lexicon::LexiconScorer;
use crate::service::InferenceService;

/// Scores within `[-NEUTRAL_BAND, NEUTRAL_BAND]` are neutral, edges included.
const NEUTRAL_BAND: f64 = 0.1;

pub struct SentimentAnalyzer {
    backend: Arc<dyn SentimentBackend>,
    /// `None` once a load was attempted and failed.
    scorer: OnceCell<Option<Arc<dyn SentimentScorer>>>,
}

impl fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("backend", &self.backend.name())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(LexiconScorer::new()))
    }
}

impl SentimentAnalyzer {
    /// Use a scorer that is already loaded.
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            backend: Arc::new(Preloaded(Arc::clone(&scorer))),
            scorer: OnceCell::new_with(Some(Some(scorer))),
        }
    }

    /// Load the scorer from `backend` on the first request.
    pub fn with_backend(backend: Arc<dyn SentimentBackend>) -> Self {
        Self {
            backend,
            scorer: OnceCell::new(),
        }
    }

    /// Load the scorer now instead of on the first request.
    pub async fn warm_up(&self) -> Result<(), AppError> {
        self.scorer().await.map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.scorer.get(), Some(Some(_)))
    }

    pub async fn analyze(&self, text: &str) -> Result<SentimentResult, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::EmptyInput);
        }

        let scorer = self.scorer().await?;
        let owned = text.to_owned();
        let score = tokio::task::spawn_blocking(move || scorer.score(&owned))
            .await
            .map_err(AppError::unknown)?
            .map_err(|e| {
                warn!(error = %e, backend = self.backend.name(), "sentiment scoring failed");
                AppError::NoPrediction
            })?;

        let result = result_for_score(score)?;
        debug!(score, sentiment = %result.sentiment(), "analyzed text");
        Ok(result)
    }

    async fn scorer(&self) -> Result<Arc<dyn SentimentScorer>, AppError> {
        let slot = self
            .scorer
            .get_or_init(|| async {
                let backend = Arc::clone(&self.backend);
                let name = backend.name().to_string();
                match tokio::task::spawn_blocking(move || backend.load()).await {
                    Ok(Ok(scorer)) => {
                        info!(backend = %name, "loaded sentiment scorer");
                        Some(scorer)
                    }
                    Ok(Err(e)) => {
                        warn!(backend = %name, error = %e, "sentiment scorer failed to load");
                        None
                    }
                    Err(e) => {
                        warn!(backend = %name, error = %e, "sentiment scorer loader aborted");
                        None
                    }
                }
            })
            .await;

        slot.clone().ok_or(AppError::ModelLoadFailed)
    }
}

/// Backend for a scorer that needs no loading.
struct Preloaded(Arc<dyn SentimentScorer>);

impl SentimentBackend for Preloaded {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn load(&self) -> Result<Arc<dyn SentimentScorer>, BackendError> {
        Ok(Arc::clone(&self.0))
    }
}

#[async_trait]
impl InferenceService for SentimentAnalyzer {
    const MODALITY: &'static str = "sentiment";

    type Input = String;
    type Output = SentimentResult;

    async fn invoke(&self, input: String) -> Result<SentimentResult, AppError> {
        self.analyze(&input).await
    }
}

/// Map a polarity score onto a label. `0.1` and `-0.1` are neutral.
pub fn label_for_score(score: f64) -> Sentiment {
    if score > NEUTRAL_BAND {
        Sentiment::Positive
    } else if score < -NEUTRAL_BAND {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn result_for_score(score: f64) -> Result<SentimentResult, AppError> {
    if !score.is_finite() {
        return Err(AppError::NoPrediction);
    }
    let confidence = score.abs().clamp(0.0, 1.0);
    Ok(SentimentResult::new(label_for_score(score), confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed score and counts calls.
    struct FixedScorer {
        score: Result<f64, ()>,
        calls: Arc<AtomicUsize>,
    }

    impl SentimentScorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn score(&self, _text: &str) -> Result<f64, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.score
                .map_err(|()| BackendError::NoScore("scripted failure".into()))
        }
    }

    fn fixed(score: Result<f64, ()>) -> (SentimentAnalyzer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let scorer = FixedScorer {
            score,
            calls: Arc::clone(&calls),
        };
        (SentimentAnalyzer::new(Arc::new(scorer)), calls)
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(label_for_score(0.1), Sentiment::Neutral);
        assert_eq!(label_for_score(-0.1), Sentiment::Neutral);
        assert_eq!(label_for_score(0.0), Sentiment::Neutral);
        assert_eq!(label_for_score(0.100_000_1), Sentiment::Positive);
        assert_eq!(label_for_score(-0.100_000_1), Sentiment::Negative);
        assert_eq!(label_for_score(1.0), Sentiment::Positive);
        assert_eq!(label_for_score(-1.0), Sentiment::Negative);
    }

    #[test]
    fn confidence_is_clamped_magnitude() {
        for score in [-1.5, -1.0, -0.4, -0.1, 0.0, 0.05, 0.1, 0.73, 1.0, 2.0] {
            let result = result_for_score(score).unwrap();
            let expected = f64::abs(score).clamp(0.0, 1.0);
            assert_eq!(result.confidence(), expected, "score {score}");
            assert!((0.0..=1.0).contains(&result.confidence()));
        }
    }

    #[test]
    fn non_finite_score_is_no_prediction() {
        assert!(matches!(result_for_score(f64::NAN), Err(AppError::NoPrediction)));
        assert!(matches!(
            result_for_score(f64::INFINITY),
            Err(AppError::NoPrediction)
        ));
    }

    #[tokio::test]
    async fn blank_text_never_reaches_scorer() {
        let (analyzer, calls) = fixed(Ok(0.9));
        for text in ["", "   ", "\n\t  \r\n", "\u{2003}"] {
            let err = analyzer.analyze(text).await.unwrap_err();
            assert!(matches!(err, AppError::EmptyInput), "input {text:?}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scorer_failure_is_no_prediction() {
        let (analyzer, calls) = fixed(Err(()));
        let err = analyzer.analyze("something").await.unwrap_err();
        assert!(matches!(err, AppError::NoPrediction));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scorer_output_is_mapped() {
        let (analyzer, _) = fixed(Ok(-0.42));
        let result = analyzer.analyze("whatever").await.unwrap();
        assert_eq!(result.sentiment(), Sentiment::Negative);
        assert!((result.confidence() - 0.42).abs() < 1e-9);
    }

    #[tokio::test]
    async fn positive_example() {
        let analyzer = SentimentAnalyzer::default();
        let result = analyzer.analyze("I love SwiftUI so much!").await.unwrap();
        assert_eq!(result.sentiment(), Sentiment::Positive);
        assert!(result.confidence() > 0.1);
    }

    #[tokio::test]
    async fn negative_example() {
        let analyzer = SentimentAnalyzer::default();
        let result = analyzer.analyze("I hate bugs in my app.").await.unwrap();
        assert_eq!(result.sentiment(), Sentiment::Negative);
    }

    #[tokio::test]
    async fn empty_example() {
        let analyzer = SentimentAnalyzer::default();
        let err = analyzer.analyze("").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));
    }

    #[tokio::test]
    async fn confidence_in_range_for_real_text() {
        let analyzer = SentimentAnalyzer::default();
        let result = analyzer.analyze("Great product, amazing UX!").await.unwrap();
        assert!((0.0..=1.0).contains(&result.confidence()));
        assert_eq!(result.sentiment(), Sentiment::Positive);
    }

    /// Loader that always fails and counts attempts.
    struct BrokenBackend {
        loads: Arc<AtomicUsize>,
    }

    impl SentimentBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        fn load(&self) -> Result<Arc<dyn SentimentScorer>, BackendError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Load("tokenizer.json missing".into()))
        }
    }

    #[tokio::test]
    async fn failed_load_is_terminal() {
        let loads = Arc::new(AtomicUsize::new(0));
        let analyzer = SentimentAnalyzer::with_backend(Arc::new(BrokenBackend {
            loads: Arc::clone(&loads),
        }));

        for _ in 0..3 {
            let err = analyzer.analyze("great stuff").await.unwrap_err();
            assert!(matches!(err, AppError::ModelLoadFailed));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(!analyzer.is_loaded());
    }

    #[tokio::test]
    async fn blank_text_does_not_trigger_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let analyzer = SentimentAnalyzer::with_backend(Arc::new(BrokenBackend {
            loads: Arc::clone(&loads),
        }));
        let err = analyzer.analyze("  ").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lazy_backend_loads_once() {
        struct Lexicon(Arc<AtomicUsize>);

        impl SentimentBackend for Lexicon {
            fn name(&self) -> &str {
                "lexicon"
            }

            fn load(&self) -> Result<Arc<dyn SentimentScorer>, BackendError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(LexiconScorer::new()))
            }
        }

        let loads = Arc::new(AtomicUsize::new(0));
        let analyzer = SentimentAnalyzer::with_backend(Arc::new(Lexicon(Arc::clone(&loads))));
        assert!(!analyzer.is_loaded());

        analyzer.warm_up().await.unwrap();
        assert!(analyzer.is_loaded());
        let result = analyzer.analyze("I love it").await.unwrap();
        assert_eq!(result.sentiment(), Sentiment::Positive);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ready_scorer_counts_as_loaded() {
        assert!(SentimentAnalyzer::default().is_loaded());
    }
}
