use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One transcribed word with its timing, as produced by the external
/// speech recognizer. Seconds intervals are [start, end], start inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Recognizer word confidence in [0, 1]. `None` means the recognizer
    /// did not report one.
    pub confidence: Option<f32>,
}

impl TimedWord {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            confidence: None,
        }
    }
}

/// A contiguous run of words grouped into one semantic/temporal unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub words: Vec<TimedWord>,
    pub start: f64,
    pub end: f64,
    /// Word texts joined by single spaces.
    pub text: String,
}

impl Chunk {
    /// Builds a chunk from a non-empty word run. Returns `None` for an
    /// empty run so callers cannot emit a timing-less chunk.
    pub fn from_words(words: Vec<TimedWord>) -> Option<Self> {
        let first = words.first()?;
        let last = words.last()?;
        let start = first.start;
        let end = last.end;
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Some(Self {
            words,
            start,
            end,
            text,
        })
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }
}

/// Closed emotion label set. Model outputs outside this set map to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
        }
    }

    /// Maps a raw classifier label (e.g. "joy", "sadness") into the closed
    /// set. Unknown labels become `Neutral`.
    pub fn from_model_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "angry" | "anger" => EmotionLabel::Angry,
            "disgust" => EmotionLabel::Disgust,
            "fear" => EmotionLabel::Fear,
            "happy" | "happiness" | "joy" => EmotionLabel::Happy,
            "sad" | "sadness" => EmotionLabel::Sad,
            "surprise" | "surprised" => EmotionLabel::Surprise,
            _ => EmotionLabel::Neutral,
        }
    }

    pub(crate) fn index(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(4)
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output for one chunk of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub label: EmotionLabel,
    /// Classifier's self-reported certainty in [0, 1].
    pub confidence: f32,
}

impl EmotionResult {
    pub fn new(label: EmotionLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The fixed low-certainty result used for empty text, ties and
    /// per-chunk classification failures.
    pub fn neutral() -> Self {
        Self {
            label: EmotionLabel::Neutral,
            confidence: 0.5,
        }
    }
}

/// Final display unit handed to the renderer/exporter. Captions are ordered
/// by ascending start, satisfy `start < end` and never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub emotion: EmotionResult,
}

/// Per-label caption counts with derived percentages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionSummary {
    counts: [usize; 7],
    total: usize,
}

impl DistributionSummary {
    pub(crate) fn record(&mut self, label: EmotionLabel) {
        self.counts[label.index()] += 1;
        self.total += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, label: EmotionLabel) -> usize {
        self.counts[label.index()]
    }

    /// Percentage of captions carrying `label`, rounded to one decimal.
    /// Always 0.0 when no captions were recorded.
    pub fn percentage(&self, label: EmotionLabel) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let raw = self.count(label) as f64 * 100.0 / self.total as f64;
        (raw * 10.0).round() / 10.0
    }

    pub fn percentages(&self) -> BTreeMap<EmotionLabel, f64> {
        EmotionLabel::ALL
            .iter()
            .map(|&l| (l, self.percentage(l)))
            .collect()
    }
}

/// Which similarity implementation actually scored boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerMode {
    Embedding,
    Lexical,
}

/// Which emotion implementation actually classified chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    Model,
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMode {
    /// Similarity-driven chunking with an embedding scorer.
    Semantic,
    /// Hard-boundary (pause/punctuation/caps) chunking; the degraded form
    /// of semantic chunking when no embedding model is available.
    Sentence,
    /// Fixed wall-clock windows; selected by configuration, not degradation.
    Windowed,
}

/// Disclosure of which modes produced a run's output, so downstream
/// reporting can flag degraded (heuristic fallback) accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeReport {
    pub chunking: ChunkingMode,
    pub similarity: ScorerMode,
    pub emotion: ClassifierMode,
    /// Chunks whose classification failed and were substituted with the
    /// neutral fallback result.
    pub classification_failures: usize,
}

/// Transcriber handoff: the complete word sequence plus the overall audio
/// duration, used only for coverage diagnostics.
#[derive(Debug, Clone, Default)]
pub struct TranscriptInput {
    pub words: Vec<TimedWord>,
    pub audio_duration_secs: Option<f64>,
}

impl TranscriptInput {
    pub fn from_words(words: Vec<TimedWord>) -> Self {
        Self {
            words,
            audio_duration_secs: None,
        }
    }
}

/// Everything the renderer/exporter consumes from one pipeline run.
#[derive(Debug, Clone)]
pub struct CaptionOutput {
    pub captions: Vec<Caption>,
    pub distribution: DistributionSummary,
    pub modes: ModeReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_from_words_joins_text_and_spans_timing() {
        let words = vec![
            TimedWord::new("Hello", 0.0, 0.5),
            TimedWord::new("world.", 0.5, 1.0),
        ];
        let chunk = Chunk::from_words(words).expect("non-empty run");
        assert_eq!(chunk.text, "Hello world.");
        assert_eq!(chunk.start, 0.0);
        assert_eq!(chunk.end, 1.0);
        assert_eq!(chunk.word_count(), 2);
    }

    #[test]
    fn chunk_from_empty_run_is_none() {
        assert!(Chunk::from_words(Vec::new()).is_none());
    }

    #[test]
    fn model_label_mapping_is_closed() {
        assert_eq!(EmotionLabel::from_model_label("joy"), EmotionLabel::Happy);
        assert_eq!(EmotionLabel::from_model_label("SADNESS"), EmotionLabel::Sad);
        assert_eq!(EmotionLabel::from_model_label("anger"), EmotionLabel::Angry);
        assert_eq!(
            EmotionLabel::from_model_label("optimism"),
            EmotionLabel::Neutral
        );
        assert_eq!(EmotionLabel::from_model_label(""), EmotionLabel::Neutral);
    }

    #[test]
    fn label_indices_cover_all_variants() {
        for (i, label) in EmotionLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
        }
    }

    #[test]
    fn distribution_percentages_sum_near_hundred() {
        let mut summary = DistributionSummary::default();
        summary.record(EmotionLabel::Happy);
        summary.record(EmotionLabel::Happy);
        summary.record(EmotionLabel::Sad);
        let sum: f64 = EmotionLabel::ALL
            .iter()
            .map(|&l| summary.percentage(l))
            .sum();
        assert!((sum - 100.0).abs() <= 1.0);
        assert_eq!(summary.count(EmotionLabel::Happy), 2);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn empty_distribution_is_all_zero() {
        let summary = DistributionSummary::default();
        for label in EmotionLabel::ALL {
            assert_eq!(summary.percentage(label), 0.0);
            assert_eq!(summary.count(label), 0);
        }
    }

    #[test]
    fn emotion_result_confidence_is_clamped() {
        assert_eq!(EmotionResult::new(EmotionLabel::Happy, 1.7).confidence, 1.0);
        assert_eq!(EmotionResult::new(EmotionLabel::Happy, -0.2).confidence, 0.0);
    }
}
