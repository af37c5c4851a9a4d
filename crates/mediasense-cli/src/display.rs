//! Terminal rendering of settled coordinator state.
//!
//! Cards are for humans; the JSON forms carry the same fields for scripts.

use std::path::Path;

use mediasense_app::RequestState;
use mediasense_core::{ImageClassificationResult, SentimentResult};
use serde_json::{Value, json};

const KEY_WIDTH: usize = 12;
const BAR_WIDTH: usize = 20;

// ── Image ──

pub fn print_classification_card(
    path: &Path,
    state: &RequestState<ImageClassificationResult>,
    ranked: &[ImageClassificationResult],
) {
    println!("=== {} ===", path.display());
    println!();

    if let Some(error) = &state.error_message {
        print_error(error);
        return;
    }
    let Some(result) = &state.result else {
        return;
    };

    println!("Prediction");
    println!("  {:<KEY_WIDTH$} {}", "label", result.label());
    println!("  {:<KEY_WIDTH$} {}", "confidence", percent(result.confidence()));
    println!();

    if ranked.len() > 1 {
        println!("Top {}", ranked.len());
        let width = ranked.iter().map(|r| r.label().len()).max().unwrap_or(0);
        for (i, r) in ranked.iter().enumerate() {
            println!(
                "  {:>2}. {:<width$}  {} {}",
                i + 1,
                r.label(),
                bar(r.confidence()),
                percent(r.confidence())
            );
        }
        println!();
    }
}

pub fn print_classification_json(
    path: &Path,
    state: &RequestState<ImageClassificationResult>,
    ranked: &[ImageClassificationResult],
) -> anyhow::Result<()> {
    let doc = classification_doc(path, state, ranked);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn classification_doc(
    path: &Path,
    state: &RequestState<ImageClassificationResult>,
    ranked: &[ImageClassificationResult],
) -> Value {
    json!({
        "input": path.display().to_string(),
        "phase": state.phase().as_str(),
        "result": state.result,
        "top_k": ranked,
        "error": state.error_message,
    })
}

// ── Sentiment ──

pub fn print_sentiment_card(text: &str, state: &RequestState<SentimentResult>) {
    println!("=== Sentiment ===");
    println!("{}", quoted(text));
    println!();

    if let Some(error) = &state.error_message {
        print_error(error);
        return;
    }
    let Some(result) = &state.result else {
        return;
    };

    println!("  {:<KEY_WIDTH$} {}", "sentiment", result.sentiment());
    println!(
        "  {:<KEY_WIDTH$} {} {}",
        "confidence",
        bar(result.confidence()),
        percent(result.confidence())
    );
    println!();
}

pub fn print_sentiment_json(
    text: &str,
    state: &RequestState<SentimentResult>,
) -> anyhow::Result<()> {
    let doc = sentiment_doc(text, state);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn sentiment_doc(text: &str, state: &RequestState<SentimentResult>) -> Value {
    json!({
        "input": text,
        "phase": state.phase().as_str(),
        "result": state.result,
        "error": state.error_message,
    })
}

// ── Helpers ──

fn print_error(message: &str) {
    eprintln!("Error");
    eprintln!("  {message}");
}

fn percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

fn bar(confidence: f64) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn quoted(text: &str) -> String {
    const MAX_CHARS: usize = 120;
    if text.chars().count() > MAX_CHARS {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("\"{head}...\"")
    } else {
        format!("\"{text}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasense_core::Sentiment;

    #[test]
    fn bar_is_fixed_width() {
        for c in [0.0, 0.03, 0.5, 0.999, 1.0, 1.7, -0.2] {
            assert_eq!(bar(c).chars().count(), BAR_WIDTH, "confidence {c}");
        }
        assert_eq!(bar(1.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
    }

    #[test]
    fn percent_format() {
        assert_eq!(percent(0.8734), "87.3%");
        assert_eq!(percent(0.0), "0.0%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "a".repeat(300);
        let q = quoted(&long);
        assert!(q.ends_with("...\""));
        assert_eq!(q.chars().count(), 120 + 5);
        assert_eq!(quoted("short"), "\"short\"");
    }

    #[test]
    fn sentiment_doc_carries_phase_and_outcome() {
        let settled = RequestState {
            is_loading: false,
            result: Some(SentimentResult::new(Sentiment::Negative, 0.4)),
            error_message: None,
        };
        let doc = sentiment_doc("meh", &settled);
        assert_eq!(doc["phase"], "settled");
        assert_eq!(doc["input"], "meh");
        assert!(doc["error"].is_null());
        assert!(!doc["result"].is_null());

        let idle: RequestState<SentimentResult> = RequestState::default();
        assert_eq!(sentiment_doc("", &idle)["phase"], "idle");
    }

    #[test]
    fn classification_doc_lists_error() {
        let failed: RequestState<ImageClassificationResult> = RequestState {
            is_loading: false,
            result: None,
            error_message: Some("bad image".into()),
        };
        let doc = classification_doc(Path::new("cat.png"), &failed, &[]);
        assert_eq!(doc["phase"], "settled");
        assert_eq!(doc["error"], "bad image");
        assert_eq!(doc["top_k"], json!([]));
    }
}
