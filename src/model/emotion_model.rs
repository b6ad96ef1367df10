use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::config::ModelPaths;
use crate::emotion::classify_by_keywords;
use crate::error::CaptionError;
use crate::model::{encode, load_session, load_tokenizer};
use crate::pipeline::traits::EmotionClassifier;
use crate::types::{ClassifierMode, EmotionLabel, EmotionResult};

/// Process-wide emotion model instance; single load attempt, cached failure.
static CLASSIFIER: OnceLock<Option<EmotionModel>> = OnceLock::new();

/// Longest text handed to the model; transformer classifiers see little
/// beyond their context window and chunk texts are short anyway.
const MAX_INPUT_CHARS: usize = 512;

/// Output head ordering of the distilroberta emotion export. Indices beyond
/// this list and unrecognized names both resolve to neutral.
const MODEL_LABELS: [&str; 7] = [
    "anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise",
];

struct EmotionModel {
    session: Mutex<ort::session::Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl EmotionModel {
    fn load(paths: &ModelPaths) -> Result<Self, CaptionError> {
        let session = load_session(&paths.model_path, "emotion model load")?;
        let tokenizer = load_tokenizer(&paths.tokenizer_path, "emotion tokenizer load")?;
        tracing::info!(model_path = %paths.model_path, "emotion model loaded");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn predict(&self, text: &str) -> Result<EmotionResult, CaptionError> {
        let truncated: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let (ids, mask) = encode(&self.tokenizer, &truncated, "emotion tokenize")?;
        if ids.is_empty() {
            return Ok(EmotionResult::neutral());
        }

        let id_tensor =
            ort::value::TensorRef::from_array_view(([1usize, ids.len()], ids.as_slice()))
                .map_err(|e| CaptionError::model("emotion input tensor", e))?;
        let mask_tensor =
            ort::value::TensorRef::from_array_view(([1usize, mask.len()], mask.as_slice()))
                .map_err(|e| CaptionError::model("emotion mask tensor", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CaptionError::model("emotion session lock", "session mutex poisoned"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => id_tensor,
                "attention_mask" => mask_tensor
            ])
            .map_err(|e| CaptionError::model("emotion forward pass", e))?;
        if outputs.len() == 0 {
            return Err(CaptionError::model(
                "emotion forward pass",
                "model produced no outputs",
            ));
        }
        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| CaptionError::model("emotion extract logits", e))?;

        let probabilities = softmax(logits);
        let (index, probability) = argmax(&probabilities).ok_or_else(|| {
            CaptionError::model("emotion forward pass", "empty probability distribution")
        })?;
        let label = MODEL_LABELS
            .get(index)
            .map(|raw| EmotionLabel::from_model_label(raw))
            .unwrap_or(EmotionLabel::Neutral);
        Ok(EmotionResult::new(label, probability))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 {
        return exps;
    }
    exps.into_iter().map(|e| e / sum).collect()
}

fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn shared_classifier(paths: &ModelPaths) -> Option<&'static EmotionModel> {
    CLASSIFIER
        .get_or_init(|| match EmotionModel::load(paths) {
            Ok(model) => Some(model),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "emotion model unavailable, using keyword classification"
                );
                None
            }
        })
        .as_ref()
}

/// Transformer emotion classification with permanent keyword fallback.
/// Any backend failure downgrades every later call in the process to the
/// keyword heuristic; `classify` itself never fails.
pub struct OnnxEmotionClassifier {
    paths: ModelPaths,
    degraded: AtomicBool,
}

impl OnnxEmotionClassifier {
    pub fn new(paths: ModelPaths) -> Self {
        Self {
            paths,
            degraded: AtomicBool::new(false),
        }
    }

    fn predict(&self, text: &str) -> Result<EmotionResult, CaptionError> {
        let model = shared_classifier(&self.paths).ok_or_else(|| {
            CaptionError::model("emotion classifier", "shared model unavailable")
        })?;
        model.predict(text)
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&self, text: &str) -> Result<EmotionResult, CaptionError> {
        if text.trim().is_empty() {
            return Ok(EmotionResult::neutral());
        }
        if !self.degraded.load(Ordering::Relaxed) {
            match self.predict(text) {
                Ok(result) => return Ok(result),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "emotion inference failed, degrading to keyword mode"
                    );
                    self.degraded.store(true, Ordering::Relaxed);
                }
            }
        }
        Ok(classify_by_keywords(text))
    }

    fn mode(&self) -> ClassifierMode {
        if self.degraded.load(Ordering::Relaxed) {
            ClassifierMode::Keyword
        } else {
            ClassifierMode::Model
        }
    }
}
