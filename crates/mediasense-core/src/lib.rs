pub mod config;
pub mod error;
pub mod result;

pub use config::Config;
pub use error::AppError;
pub use result::{ImageClassificationResult, Sentiment, SentimentResult};
