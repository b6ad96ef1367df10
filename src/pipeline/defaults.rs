use crate::emotion::classify_by_keywords;
use crate::error::CaptionError;
use crate::pipeline::traits::{EmotionClassifier, SimilarityScorer};
use crate::similarity::jaccard_similarity;
use crate::types::{ClassifierMode, EmotionResult, ScorerMode};

/// Token-overlap similarity. The always-available basic mode, and the
/// permanent fallback of the embedding scorer.
pub struct LexicalScorer;

impl SimilarityScorer for LexicalScorer {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        jaccard_similarity(a, b)
    }

    fn mode(&self) -> ScorerMode {
        ScorerMode::Lexical
    }
}

/// Keyword-counting emotion classification. The always-available basic
/// mode, and the permanent fallback of the model classifier.
pub struct KeywordClassifier;

impl EmotionClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<EmotionResult, CaptionError> {
        Ok(classify_by_keywords(text))
    }

    fn mode(&self) -> ClassifierMode {
        ClassifierMode::Keyword
    }
}
