use crate::error::CaptionError;
use crate::types::{ClassifierMode, EmotionResult, ScorerMode};

/// Scores how semantically related two pieces of text are, in [0, 1].
///
/// Implementations must be infallible: an advanced backend that cannot run
/// falls back to a heuristic internally and reports the downgrade through
/// `mode()` instead of erroring.
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f32;

    /// The implementation that actually produced recent scores. Flips to
    /// the degraded mode permanently once a backend fails.
    fn mode(&self) -> ScorerMode;
}

/// Assigns an emotion label with confidence to a chunk of text.
///
/// Built-in implementations never return `Err`; the error channel exists so
/// injected classifiers can fail per chunk, in which case the pipeline
/// substitutes a neutral result and keeps going.
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<EmotionResult, CaptionError>;

    fn mode(&self) -> ClassifierMode;
}
