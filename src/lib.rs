pub mod captioning;
pub mod config;
pub mod emotion;
pub mod error;
#[cfg(feature = "onnx")]
mod model;
pub mod pipeline;
pub mod similarity;
pub mod types;

pub use config::{CaptionConfig, ModelPaths};
pub use error::CaptionError;
pub use pipeline::builder::CaptionEngineBuilder;
pub use pipeline::defaults::{KeywordClassifier, LexicalScorer};
pub use pipeline::runtime::CaptionEngine;
pub use pipeline::traits::{EmotionClassifier, SimilarityScorer};
pub use types::{
    Caption, CaptionOutput, Chunk, ChunkingMode, ClassifierMode, DistributionSummary,
    EmotionLabel, EmotionResult, ModeReport, ScorerMode, TimedWord, TranscriptInput,
};

#[cfg(feature = "onnx")]
pub use model::embedder::OnnxEmbeddingScorer;
#[cfg(feature = "onnx")]
pub use model::emotion_model::OnnxEmotionClassifier;
