use std::path::Path;

use crate::error::CaptionError;

/// Opaque model identifiers handed to the advanced backends. The ONNX
/// runtime needs both the exported graph and its tokenizer definition.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct ModelPaths {
    #[serde(default)]
    pub model_path: String,
    #[serde(default)]
    pub tokenizer_path: String,
}

impl ModelPaths {
    pub fn is_configured(&self) -> bool {
        !self.model_path.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub enable_semantic_chunking: bool,
    pub enable_advanced_emotions: bool,
    /// Boundary decision threshold in [0, 1]; consecutive units scoring
    /// below it start a new chunk.
    pub similarity_threshold: f64,
    /// Silence between a word's end and the next word's start that forces
    /// a chunk boundary, in seconds.
    pub pause_gap_secs: f64,
    pub max_chunk_words: usize,
    pub max_chunk_duration_secs: f64,
    /// Window length of the fixed-duration fallback chunking mode.
    pub window_secs: f64,
    pub embedding_model: ModelPaths,
    pub emotion_model: ModelPaths,
    /// Worker threads for chunk classification. 1 keeps the pipeline
    /// fully sequential.
    pub classify_workers: usize,
}

impl CaptionConfig {
    pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
    pub const DEFAULT_PAUSE_GAP_SECS: f64 = 1.5;
    pub const DEFAULT_MAX_CHUNK_WORDS: usize = 15;
    pub const DEFAULT_MAX_CHUNK_DURATION_SECS: f64 = 8.0;
    pub const DEFAULT_WINDOW_SECS: f64 = 4.0;

    pub fn load(path: &Path) -> Result<Self, CaptionError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CaptionError::io("read caption config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| CaptionError::json("parse caption config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CaptionError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(CaptionError::invalid_config(format!(
                "similarity_threshold {} outside [0, 1]",
                self.similarity_threshold
            )));
        }
        if self.pause_gap_secs <= 0.0 {
            return Err(CaptionError::invalid_config("pause_gap_secs must be > 0"));
        }
        if self.max_chunk_words == 0 {
            return Err(CaptionError::invalid_config("max_chunk_words must be >= 1"));
        }
        if self.max_chunk_duration_secs <= 0.0 {
            return Err(CaptionError::invalid_config(
                "max_chunk_duration_secs must be > 0",
            ));
        }
        if self.window_secs <= 0.0 {
            return Err(CaptionError::invalid_config("window_secs must be > 0"));
        }
        if self.classify_workers == 0 {
            return Err(CaptionError::invalid_config(
                "classify_workers must be >= 1",
            ));
        }
        Ok(())
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enable_semantic_chunking: true,
            enable_advanced_emotions: true,
            similarity_threshold: Self::DEFAULT_SIMILARITY_THRESHOLD,
            pause_gap_secs: Self::DEFAULT_PAUSE_GAP_SECS,
            max_chunk_words: Self::DEFAULT_MAX_CHUNK_WORDS,
            max_chunk_duration_secs: Self::DEFAULT_MAX_CHUNK_DURATION_SECS,
            window_secs: Self::DEFAULT_WINDOW_SECS,
            embedding_model: ModelPaths::default(),
            emotion_model: ModelPaths::default(),
            classify_workers: 1,
        }
    }
}
