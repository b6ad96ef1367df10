use crate::config::CaptionConfig;
use crate::error::CaptionError;
use crate::pipeline::defaults::{KeywordClassifier, LexicalScorer};
use crate::pipeline::runtime::CaptionEngine;
use crate::pipeline::traits::{EmotionClassifier, SimilarityScorer};

pub struct CaptionEngineBuilder {
    config: CaptionConfig,
    scorer: Option<Box<dyn SimilarityScorer>>,
    classifier: Option<Box<dyn EmotionClassifier>>,
}

impl CaptionEngineBuilder {
    pub fn new(config: CaptionConfig) -> Self {
        Self {
            config,
            scorer: None,
            classifier: None,
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn build(self) -> Result<CaptionEngine, CaptionError> {
        self.config.validate()?;

        let scorer = match self.scorer {
            Some(scorer) => scorer,
            None => default_scorer(&self.config),
        };
        let classifier = match self.classifier {
            Some(classifier) => classifier,
            None => default_classifier(&self.config),
        };

        Ok(CaptionEngine::from_parts(self.config, scorer, classifier))
    }
}

#[cfg(feature = "onnx")]
fn default_scorer(config: &CaptionConfig) -> Box<dyn SimilarityScorer> {
    if config.enable_semantic_chunking && config.embedding_model.is_configured() {
        return Box::new(crate::model::embedder::OnnxEmbeddingScorer::new(
            config.embedding_model.clone(),
        ));
    }
    Box::new(LexicalScorer)
}

#[cfg(not(feature = "onnx"))]
fn default_scorer(_config: &CaptionConfig) -> Box<dyn SimilarityScorer> {
    Box::new(LexicalScorer)
}

#[cfg(feature = "onnx")]
fn default_classifier(config: &CaptionConfig) -> Box<dyn EmotionClassifier> {
    if config.enable_advanced_emotions && config.emotion_model.is_configured() {
        return Box::new(crate::model::emotion_model::OnnxEmotionClassifier::new(
            config.emotion_model.clone(),
        ));
    }
    Box::new(KeywordClassifier)
}

#[cfg(not(feature = "onnx"))]
fn default_classifier(_config: &CaptionConfig) -> Box<dyn EmotionClassifier> {
    Box::new(KeywordClassifier)
}
