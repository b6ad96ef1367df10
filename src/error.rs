use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// Advanced model backend failure. Recovered by falling back to the
    /// heuristic implementation for the rest of the run; never surfaced
    /// out of the pipeline.
    #[error("{context}: {message}")]
    Model {
        context: &'static str,
        message: String,
    },
    /// Chunk/emotion count disagreement in the assembler. Indicates a
    /// pipeline bug rather than bad input, so it is fatal.
    #[error("caption assembly received {chunks} chunks but {emotions} emotion results")]
    LengthMismatch { chunks: usize, emotions: usize },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("caption generation cancelled")]
    Cancelled,
}

impl CaptionError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    #[allow(dead_code)]
    pub(crate) fn model(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Model {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
