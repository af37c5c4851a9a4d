//! Value records produced by a successful inference.
//!
//! Results are immutable once built. A coordinator replaces its result on
//! every request rather than mutating the previous one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top prediction for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageClassificationResult {
    id: Uuid,
    label: String,
    confidence: f64,
}

impl ImageClassificationResult {
    /// Build a result with a fresh identifier.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            confidence,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Polarity label for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Sentiment label with a heuristic strength in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    sentiment: Sentiment,
    confidence: f64,
}

impl SentimentResult {
    pub fn new(sentiment: Sentiment, confidence: f64) -> Self {
        Self {
            sentiment,
            confidence,
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_result_reads_back_fields() {
        let result = ImageClassificationResult::new("Cat", 0.95);
        assert_eq!(result.label(), "Cat");
        assert!((result.confidence() - 0.95).abs() < 1e-4);
    }

    #[test]
    fn image_results_have_unique_ids() {
        let first = ImageClassificationResult::new("Dog", 0.80);
        let second = ImageClassificationResult::new("Dog", 0.80);
        assert_ne!(first.id(), second.id(), "each result should get its own id");
        assert_ne!(first, second);
    }

    #[test]
    fn sentiment_result_reads_back_fields() {
        let result = SentimentResult::new(Sentiment::Positive, 0.88);
        assert_eq!(result.sentiment(), Sentiment::Positive);
        assert_eq!(result.sentiment().to_string(), "Positive");
        assert!((result.confidence() - 0.88).abs() < 1e-4);
    }

    #[test]
    fn sentiment_labels_parse_case_insensitively() {
        assert_eq!("positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("NEGATIVE".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!("Neutral".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert!("meh".parse::<Sentiment>().is_err());
    }

    #[test]
    fn sentiment_result_serializes_label_as_word() {
        let result = SentimentResult::new(Sentiment::Negative, 0.45);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment"], "Negative");
        assert!((json["confidence"].as_f64().unwrap() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn image_result_json_round_trip_keeps_id() {
        let result = ImageClassificationResult::new("tabby", 0.61);
        let json = serde_json::to_string(&result).unwrap();
        let back: ImageClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
