mod display;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediasense_ai::{ImageClassifier, OnnxImageBackend, OnnxSentimentBackend, SentimentAnalyzer};
use mediasense_app::{ImageCoordinator, SentimentCoordinator, TextCoordinator};
use mediasense_core::{Config, ImageClassificationResult};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "mediasense",
    version,
    about = "On-device image classification and sentiment analysis"
)]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true, env = "MEDIASENSE_CONFIG")]
    config: Option<PathBuf>,

    /// Image model directory (model.onnx + labels.txt). Overrides the config.
    #[arg(long, global = true, env = "MEDIASENSE_IMAGE_MODEL")]
    image_model: Option<PathBuf>,

    /// Sentiment model directory (model.onnx + tokenizer.json). Overrides the
    /// config. Without one the built-in lexicon scorer is used.
    #[arg(long, global = true, env = "MEDIASENSE_SENTIMENT_MODEL")]
    sentiment_model: Option<PathBuf>,

    /// Print JSON instead of a card.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an image file.
    Classify {
        /// Path to a PNG, JPEG or other supported image.
        path: PathBuf,
        /// Number of ranked labels to show (defaults to `top_k` from config).
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
    },
    /// Analyze the sentiment of a piece of text.
    Sentiment {
        /// Text to analyze. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("mediasense v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let ok = match cli.command {
        Command::Classify { ref path, top_k } => {
            cmd_classify(&config, path, top_k.unwrap_or(config.top_k), cli.json).await?
        }
        Command::Sentiment { ref text } => {
            cmd_sentiment(&config, &text.join(" "), cli.json).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.image_model {
        config.image_model_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.sentiment_model {
        config.sentiment_model_dir = Some(dir.clone());
    }
    Ok(config)
}

// ── Commands ──

async fn cmd_classify(
    config: &Config,
    path: &Path,
    top_k: usize,
    json: bool,
) -> anyhow::Result<bool> {
    let model_dir = config
        .image_model_dir
        .as_deref()
        .context("no image model configured; pass --image-model or set image_model_dir")?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let backend = OnnxImageBackend::new(model_dir, config.image_input_size);
    let coordinator = ImageCoordinator::new(Arc::new(ImageClassifier::new(Arc::new(backend))));

    coordinator.submit(bytes.clone()).await;
    let state = coordinator.state();

    let ranked = if state.result.is_some() {
        ranked_labels(coordinator.service(), &bytes, top_k).await
    } else {
        Vec::new()
    };

    if json {
        display::print_classification_json(path, &state, &ranked)?;
    } else {
        display::print_classification_card(path, &state, &ranked);
    }
    Ok(state.error_message.is_none())
}

/// Runner-up list for the card. The model is warm by now, so this costs one
/// more forward pass. Empty when `top_k <= 1` or the pass fails.
async fn ranked_labels(
    classifier: &ImageClassifier,
    bytes: &[u8],
    top_k: usize,
) -> Vec<ImageClassificationResult> {
    if top_k <= 1 {
        return Vec::new();
    }
    match classifier.classify_top_k(bytes, top_k).await {
        Ok(ranked) => ranked,
        Err(e) => {
            warn!(error = %e, kind = e.kind(), top_k, "ranked labels unavailable");
            Vec::new()
        }
    }
}

async fn cmd_sentiment(config: &Config, text: &str, json: bool) -> anyhow::Result<bool> {
    // A model that fails to load settles as an error on submit.
    let analyzer = match &config.sentiment_model_dir {
        Some(dir) => SentimentAnalyzer::with_backend(Arc::new(OnnxSentimentBackend::new(dir))),
        None => SentimentAnalyzer::default(),
    };
    let coordinator: SentimentCoordinator = TextCoordinator::new(Arc::new(analyzer));

    coordinator.set_text_input(text);
    coordinator.submit_draft().await;
    let state = coordinator.state();

    if json {
        display::print_sentiment_json(text, &state)?;
    } else {
        display::print_sentiment_card(text, &state);
    }
    Ok(state.error_message.is_none())
}
