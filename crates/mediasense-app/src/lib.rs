//! Request coordinators: the bridge between a presentation layer and the
//! inference services.
//!
//! A coordinator owns the observable state of one modality (`is_loading`,
//! `result`, `error_message`), drives its service on `submit`, and publishes
//! every transition through a [`tokio::sync::watch`] channel. Errors never
//! escape a coordinator; they settle into `error_message`.

mod coordinator;
mod state;
mod text;

pub use coordinator::Coordinator;
pub use state::{Phase, RequestState};
pub use text::TextCoordinator;

use mediasense_ai::{ImageClassifier, SentimentAnalyzer};

pub type ImageCoordinator = Coordinator<ImageClassifier>;
pub type SentimentCoordinator = TextCoordinator<SentimentAnalyzer>;
