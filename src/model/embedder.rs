use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::config::ModelPaths;
use crate::error::CaptionError;
use crate::model::{encode, load_session, load_tokenizer};
use crate::pipeline::traits::SimilarityScorer;
use crate::similarity::{clamped_cosine, jaccard_similarity};
use crate::types::ScorerMode;

/// Process-wide embedding model instance. Loaded at most once; a failed
/// load is cached as `None` so the expensive attempt is never repeated.
static EMBEDDER: OnceLock<Option<EmbeddingModel>> = OnceLock::new();

struct EmbeddingModel {
    session: Mutex<ort::session::Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl EmbeddingModel {
    fn load(paths: &ModelPaths) -> Result<Self, CaptionError> {
        let session = load_session(&paths.model_path, "embedding model load")?;
        let tokenizer = load_tokenizer(&paths.tokenizer_path, "embedding tokenizer load")?;
        tracing::info!(
            model_path = %paths.model_path,
            "sentence embedding model loaded"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, CaptionError> {
        let (ids, mask) = encode(&self.tokenizer, text, "embedding tokenize")?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_tensor =
            ort::value::TensorRef::from_array_view(([1usize, ids.len()], ids.as_slice()))
                .map_err(|e| CaptionError::model("embedding input tensor", e))?;
        let mask_tensor =
            ort::value::TensorRef::from_array_view(([1usize, mask.len()], mask.as_slice()))
                .map_err(|e| CaptionError::model("embedding mask tensor", e))?;

        let mut session = self.session.lock().map_err(|_| {
            CaptionError::model("embedding session lock", "session mutex poisoned")
        })?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => id_tensor,
                "attention_mask" => mask_tensor
            ])
            .map_err(|e| CaptionError::model("embedding forward pass", e))?;
        if outputs.len() == 0 {
            return Err(CaptionError::model(
                "embedding forward pass",
                "model produced no outputs",
            ));
        }
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| CaptionError::model("embedding extract output", e))?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        mean_pool(&dims, data, &mask)
    }
}

/// Attention-masked mean pooling over token states ([1, seq, hidden]).
/// Exports that already pool to a sentence vector ([1, hidden]) pass
/// through unchanged.
fn mean_pool(dims: &[usize], data: &[f32], mask: &[i64]) -> Result<Vec<f32>, CaptionError> {
    match dims {
        [1, hidden] if data.len() == *hidden => Ok(data.to_vec()),
        [1, seq, hidden] if data.len() == seq * hidden && mask.len() == *seq => {
            let mut pooled = vec![0.0f32; *hidden];
            let mut kept = 0usize;
            for (t, &m) in mask.iter().enumerate() {
                if m == 0 {
                    continue;
                }
                kept += 1;
                let row = &data[t * hidden..(t + 1) * hidden];
                for (p, &v) in pooled.iter_mut().zip(row.iter()) {
                    *p += v;
                }
            }
            if kept == 0 {
                return Ok(Vec::new());
            }
            for p in pooled.iter_mut() {
                *p /= kept as f32;
            }
            Ok(pooled)
        }
        _ => Err(CaptionError::model(
            "embedding extract output",
            format!("unexpected output shape {dims:?}"),
        )),
    }
}

fn shared_embedder(paths: &ModelPaths) -> Option<&'static EmbeddingModel> {
    EMBEDDER
        .get_or_init(|| match EmbeddingModel::load(paths) {
            Ok(model) => Some(model),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "embedding model unavailable, using lexical similarity"
                );
                None
            }
        })
        .as_ref()
}

/// Sentence-embedding similarity with permanent lexical fallback.
///
/// The first backend failure (load or inference) flips the scorer into
/// lexical mode for the rest of the process; it never errors out of a run.
pub struct OnnxEmbeddingScorer {
    paths: ModelPaths,
    degraded: AtomicBool,
}

impl OnnxEmbeddingScorer {
    pub fn new(paths: ModelPaths) -> Self {
        Self {
            paths,
            degraded: AtomicBool::new(false),
        }
    }

    fn embed_similarity(&self, a: &str, b: &str) -> Result<f32, CaptionError> {
        let model = shared_embedder(&self.paths).ok_or_else(|| {
            CaptionError::model("embedding scorer", "shared model unavailable")
        })?;
        let va = model.embed(a)?;
        let vb = model.embed(b)?;
        Ok(clamped_cosine(&va, &vb))
    }
}

impl SimilarityScorer for OnnxEmbeddingScorer {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        // Same convention as the lexical mode: nothing vs nothing is not a
        // disagreement, and models produce no vector for empty text anyway.
        if a.trim().is_empty() && b.trim().is_empty() {
            return 1.0;
        }
        if !self.degraded.load(Ordering::Relaxed) {
            match self.embed_similarity(a, b) {
                Ok(score) => return score,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "embedding similarity failed, degrading to lexical mode"
                    );
                    self.degraded.store(true, Ordering::Relaxed);
                }
            }
        }
        jaccard_similarity(a, b)
    }

    fn mode(&self) -> ScorerMode {
        if self.degraded.load(Ordering::Relaxed) {
            ScorerMode::Lexical
        } else {
            ScorerMode::Embedding
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_degrades_to_lexical_permanently() {
        let scorer = OnnxEmbeddingScorer::new(ModelPaths {
            model_path: "/nonexistent/embedding.onnx".to_string(),
            tokenizer_path: "/nonexistent/tokenizer.json".to_string(),
        });
        assert_eq!(scorer.mode(), ScorerMode::Embedding);
        // Scores come from the lexical fallback once loading fails.
        assert_eq!(scorer.similarity("same text", "same text"), 1.0);
        assert_eq!(scorer.mode(), ScorerMode::Lexical);
        assert_eq!(scorer.similarity("alpha", "beta"), 0.0);
    }

    #[test]
    fn empty_pair_is_maximally_similar_without_the_model() {
        let scorer = OnnxEmbeddingScorer::new(ModelPaths::default());
        assert_eq!(scorer.similarity("", ""), 1.0);
    }
}
