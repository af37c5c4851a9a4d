//! Valence-lexicon sentiment scorer.
//!
//! Each known word carries a valence on a -4..4 scale. Negators flip and
//! dampen the next few words, boosters and dampeners nudge the magnitude of
//! the following word, and trailing exclamation marks amplify the total. The
//! summed valence is squashed into `[-1, 1]` with `s / sqrt(s² + α)`.

use crate::backend::{BackendError, SentimentScorer};

/// Normalization constant: a raw sum of ±α^½ maps to roughly ±0.7.
const ALPHA: f64 = 15.0;
/// Multiplier applied to a word in the scope of a negator.
const NEGATION_SCALAR: f64 = -0.74;
/// How many preceding tokens a negator reaches.
const NEGATION_WINDOW: usize = 3;
const BOOST: f64 = 0.293;
const EXCLAMATION_BOOST: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

const VALENCE: &[(&str, f64)] = &[
    // positive
    ("adore", 2.9),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("delight", 2.9),
    ("delightful", 2.9),
    ("enjoy", 2.2),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fast", 1.0),
    ("fine", 0.8),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("like", 1.5),
    ("liked", 1.5),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("recommend", 1.5),
    ("smooth", 1.2),
    ("superb", 3.1),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("works", 0.9),
    // negative
    ("angry", -2.3),
    ("annoying", -1.9),
    ("awful", -2.0),
    ("bad", -2.5),
    ("broken", -2.0),
    ("bug", -1.0),
    ("buggy", -1.9),
    ("bugs", -1.0),
    ("crash", -1.7),
    ("crashes", -1.7),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disgusting", -2.4),
    ("fail", -2.5),
    ("failed", -2.3),
    ("frustrating", -2.1),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("poor", -2.1),
    ("problem", -1.7),
    ("sad", -2.1),
    ("slow", -0.8),
    ("terrible", -2.1),
    ("ugly", -2.3),
    ("useless", -1.8),
    ("waste", -1.8),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "without",
];

const BOOSTERS: &[&str] = &[
    "absolutely",
    "completely",
    "extremely",
    "highly",
    "incredibly",
    "really",
    "so",
    "totally",
    "truly",
    "very",
];

const DAMPENERS: &[&str] = &["barely", "hardly", "slightly", "somewhat", "marginally"];

/// Lexicon-based scorer with no external model files.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> Result<f64, BackendError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(BackendError::NoScore("text has no words".into()));
        }

        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(mut valence) = valence_of(token) else {
                continue;
            };

            if let Some(prev) = i.checked_sub(1).map(|j| tokens[j].as_str()) {
                if BOOSTERS.contains(&prev) {
                    valence += BOOST * valence.signum();
                } else if DAMPENERS.contains(&prev) {
                    valence -= BOOST * valence.signum();
                }
            }

            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|t| is_negator(t)) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }

        if sum != 0.0 {
            let bangs = text.chars().filter(|&c| c == '!').count().min(MAX_EXCLAMATIONS);
            sum += bangs as f64 * EXCLAMATION_BOOST * sum.signum();
        }

        Ok(normalize(sum))
    }
}

fn valence_of(token: &str) -> Option<f64> {
    VALENCE
        .iter()
        .find(|(word, _)| *word == token)
        .map(|&(_, v)| v)
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

/// Lowercased word tokens. Apostrophes stay inside words so contractions
/// like "don't" survive as one token.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| t.chars().any(char::is_alphabetic))
        .map(str::to_owned)
        .collect()
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}
