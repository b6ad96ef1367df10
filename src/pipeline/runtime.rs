use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::captioning::assemble::assemble;
use crate::captioning::chunking::{chunk_words, sentence_chunks};
use crate::captioning::report::summarize;
use crate::captioning::sanitize_timing;
use crate::captioning::windowing::window_words;
use crate::config::CaptionConfig;
use crate::error::CaptionError;
use crate::pipeline::traits::{EmotionClassifier, SimilarityScorer};
use crate::types::{
    CaptionOutput, Chunk, ChunkingMode, EmotionResult, ModeReport, ScorerMode, TranscriptInput,
};

pub struct CaptionEngine {
    config: CaptionConfig,
    scorer: Box<dyn SimilarityScorer>,
    classifier: Box<dyn EmotionClassifier>,
}

impl CaptionEngine {
    pub(crate) fn from_parts(
        config: CaptionConfig,
        scorer: Box<dyn SimilarityScorer>,
        classifier: Box<dyn EmotionClassifier>,
    ) -> Self {
        Self {
            config,
            scorer,
            classifier,
        }
    }

    pub fn generate(&self, input: &TranscriptInput) -> Result<CaptionOutput, CaptionError> {
        let cancel = AtomicBool::new(false);
        self.generate_with_cancel(input, &cancel)
    }

    /// Runs the full caption pipeline, checking `cancel` between chunk
    /// classifications. A raised flag surfaces as `CaptionError::Cancelled`.
    pub fn generate_with_cancel(
        &self,
        input: &TranscriptInput,
        cancel: &AtomicBool,
    ) -> Result<CaptionOutput, CaptionError> {
        let words = sanitize_timing(&input.words);
        if words.is_empty() {
            tracing::warn!("no usable words in transcript");
            return Ok(CaptionOutput {
                captions: Vec::new(),
                distribution: Default::default(),
                modes: self.mode_report(self.chunking_mode(), 0),
            });
        }

        let chunking_mode = self.chunking_mode();
        let chunks = match chunking_mode {
            ChunkingMode::Semantic => chunk_words(&words, self.scorer.as_ref(), &self.config),
            ChunkingMode::Sentence => sentence_chunks(&words, &self.config),
            ChunkingMode::Windowed => window_words(&words, self.config.window_secs),
        };
        tracing::debug!(
            words = words.len(),
            chunks = chunks.len(),
            "chunking complete"
        );

        let (emotions, failures) = self.classify_chunks(&chunks, cancel)?;
        let captions = assemble(&chunks, &emotions)?;
        let distribution = summarize(&captions);
        let modes = self.mode_report(chunking_mode, failures);

        let span_secs = captions.last().map(|c| c.end).unwrap_or(0.0);
        tracing::info!(
            captions = captions.len(),
            span_secs,
            audio_duration_secs = input.audio_duration_secs,
            chunking = ?modes.chunking,
            similarity = ?modes.similarity,
            emotion = ?modes.emotion,
            classification_failures = failures,
            "caption generation complete"
        );

        Ok(CaptionOutput {
            captions,
            distribution,
            modes,
        })
    }

    /// Classifies every chunk, substituting a neutral result for per-chunk
    /// failures. With more than one configured worker the chunk list is
    /// split into contiguous batches writing into a pre-sized result buffer,
    /// so output order never depends on scheduling.
    fn classify_chunks(
        &self,
        chunks: &[Chunk],
        cancel: &AtomicBool,
    ) -> Result<(Vec<EmotionResult>, usize), CaptionError> {
        if chunks.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let workers = self.config.classify_workers.min(chunks.len());
        if workers <= 1 {
            let mut results = Vec::with_capacity(chunks.len());
            let mut failures = 0usize;
            for chunk in chunks {
                if cancel.load(Ordering::Relaxed) {
                    return Err(CaptionError::Cancelled);
                }
                results.push(self.classify_one(chunk, &mut failures));
            }
            return Ok((results, failures));
        }

        let mut results = vec![EmotionResult::neutral(); chunks.len()];
        let failures = AtomicUsize::new(0);
        let batch = chunks.len().div_ceil(workers);
        std::thread::scope(|s| {
            for (chunk_batch, out_batch) in chunks.chunks(batch).zip(results.chunks_mut(batch)) {
                let classifier = self.classifier.as_ref();
                let failures = &failures;
                s.spawn(move || {
                    for (chunk, slot) in chunk_batch.iter().zip(out_batch.iter_mut()) {
                        if cancel.load(Ordering::Relaxed) {
                            return;
                        }
                        match classifier.classify(&chunk.text) {
                            Ok(result) => *slot = result,
                            Err(err) => {
                                tracing::warn!(
                                    error = %err,
                                    text = %chunk.text,
                                    "chunk classification failed, using neutral"
                                );
                                failures.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                });
            }
        });
        if cancel.load(Ordering::Relaxed) {
            return Err(CaptionError::Cancelled);
        }
        Ok((results, failures.into_inner()))
    }

    fn classify_one(&self, chunk: &Chunk, failures: &mut usize) -> EmotionResult {
        match self.classifier.classify(&chunk.text) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    text = %chunk.text,
                    "chunk classification failed, using neutral"
                );
                *failures += 1;
                EmotionResult::neutral()
            }
        }
    }

    /// Similarity-driven chunking needs an embedding scorer behind it; a
    /// scorer already degraded to lexical mode would split on word-level
    /// token overlap, which fragments nearly every continuation. Degraded
    /// runs therefore fall back to hard-boundary sentence chunking, as the
    /// windowed mode stays a pure configuration choice.
    fn chunking_mode(&self) -> ChunkingMode {
        if !self.config.enable_semantic_chunking {
            return ChunkingMode::Windowed;
        }
        match self.scorer.mode() {
            ScorerMode::Embedding => ChunkingMode::Semantic,
            ScorerMode::Lexical => ChunkingMode::Sentence,
        }
    }

    fn mode_report(
        &self,
        chunking: ChunkingMode,
        classification_failures: usize,
    ) -> ModeReport {
        ModeReport {
            chunking,
            similarity: self.scorer.mode(),
            emotion: self.classifier.mode(),
            classification_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::builder::CaptionEngineBuilder;
    use crate::types::{ClassifierMode, EmotionLabel, ScorerMode, TimedWord};

    struct JoinAllScorer;

    impl SimilarityScorer for JoinAllScorer {
        fn similarity(&self, _a: &str, _b: &str) -> f32 {
            1.0
        }

        fn mode(&self) -> ScorerMode {
            ScorerMode::Lexical
        }
    }

    /// Classifies by the first word of the chunk text, so positional
    /// ordering of parallel results is observable.
    struct FirstWordClassifier;

    impl EmotionClassifier for FirstWordClassifier {
        fn classify(&self, text: &str) -> Result<EmotionResult, CaptionError> {
            let first = text
                .split_whitespace()
                .next()
                .map(|w| w.trim_end_matches('.'));
            let label = match first {
                Some("happy") => EmotionLabel::Happy,
                Some("sad") => EmotionLabel::Sad,
                Some("fail") => {
                    return Err(CaptionError::model("first-word classifier", "poisoned chunk"))
                }
                _ => EmotionLabel::Neutral,
            };
            Ok(EmotionResult::new(label, 0.9))
        }

        fn mode(&self) -> ClassifierMode {
            ClassifierMode::Keyword
        }
    }

    fn engine_with(classify_workers: usize) -> CaptionEngine {
        let config = CaptionConfig {
            classify_workers,
            ..CaptionConfig::default()
        };
        CaptionEngineBuilder::new(config)
            .with_scorer(Box::new(JoinAllScorer))
            .with_classifier(Box::new(FirstWordClassifier))
            .build()
            .expect("valid config")
    }

    // Each word ends with '.' so every word becomes its own chunk.
    fn sentence_words(texts: &[&str]) -> Vec<TimedWord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TimedWord::new(format!("{t}."), i as f64, i as f64 + 0.5))
            .collect()
    }

    #[test]
    fn empty_transcript_is_an_empty_output_not_an_error() {
        let output = engine_with(1)
            .generate(&TranscriptInput::default())
            .expect("empty input");
        assert!(output.captions.is_empty());
        assert_eq!(output.distribution.total(), 0);
        assert_eq!(output.modes.classification_failures, 0);
    }

    #[test]
    fn parallel_classification_preserves_chunk_order() {
        let input = TranscriptInput::from_words(sentence_words(&[
            "happy", "sad", "happy", "sad", "happy", "sad", "happy",
        ]));
        let sequential = engine_with(1).generate(&input).expect("run");
        let parallel = engine_with(3).generate(&input).expect("run");
        assert_eq!(sequential.captions.len(), 7);
        let seq_labels: Vec<_> = sequential
            .captions
            .iter()
            .map(|c| c.emotion.label)
            .collect();
        let par_labels: Vec<_> = parallel.captions.iter().map(|c| c.emotion.label).collect();
        assert_eq!(seq_labels, par_labels);
        assert_eq!(seq_labels[0], EmotionLabel::Happy);
        assert_eq!(seq_labels[1], EmotionLabel::Sad);
    }

    #[test]
    fn per_chunk_failure_substitutes_neutral_without_aborting() {
        let input = TranscriptInput::from_words(sentence_words(&["happy", "fail", "sad"]));
        for workers in [1, 2] {
            let output = engine_with(workers).generate(&input).expect("run");
            assert_eq!(output.captions.len(), 3);
            assert_eq!(output.captions[0].emotion.label, EmotionLabel::Happy);
            assert_eq!(output.captions[1].emotion, EmotionResult::neutral());
            assert_eq!(output.captions[2].emotion.label, EmotionLabel::Sad);
            assert_eq!(output.modes.classification_failures, 1);
        }
    }

    #[test]
    fn raised_cancel_flag_stops_the_run() {
        let input = TranscriptInput::from_words(sentence_words(&["happy", "sad"]));
        let cancel = AtomicBool::new(true);
        let result = engine_with(1).generate_with_cancel(&input, &cancel);
        assert!(matches!(result, Err(CaptionError::Cancelled)));
        let result = engine_with(2).generate_with_cancel(&input, &cancel);
        assert!(matches!(result, Err(CaptionError::Cancelled)));
    }

    #[test]
    fn windowed_mode_bypasses_the_scorer() {
        struct PanickyScorer;
        impl SimilarityScorer for PanickyScorer {
            fn similarity(&self, _a: &str, _b: &str) -> f32 {
                panic!("scorer must not run in windowed mode");
            }
            fn mode(&self) -> ScorerMode {
                ScorerMode::Lexical
            }
        }

        let config = CaptionConfig {
            enable_semantic_chunking: false,
            ..CaptionConfig::default()
        };
        let engine = CaptionEngineBuilder::new(config)
            .with_scorer(Box::new(PanickyScorer))
            .with_classifier(Box::new(FirstWordClassifier))
            .build()
            .expect("valid config");
        let input = TranscriptInput::from_words(vec![
            TimedWord::new("happy", 0.0, 0.5),
            TimedWord::new("words", 0.5, 1.0),
            TimedWord::new("here", 6.0, 6.5),
        ]);
        let output = engine.generate(&input).expect("run");
        assert_eq!(output.captions.len(), 2);
        assert_eq!(output.modes.chunking, ChunkingMode::Windowed);
    }

    #[test]
    fn embedding_scorer_enables_semantic_splitting() {
        struct SplitterScorer;
        impl SimilarityScorer for SplitterScorer {
            fn similarity(&self, _a: &str, _b: &str) -> f32 {
                0.0
            }
            fn mode(&self) -> ScorerMode {
                ScorerMode::Embedding
            }
        }

        let engine = CaptionEngineBuilder::new(CaptionConfig::default())
            .with_scorer(Box::new(SplitterScorer))
            .with_classifier(Box::new(FirstWordClassifier))
            .build()
            .expect("valid config");
        let input = TranscriptInput::from_words(vec![
            TimedWord::new("happy", 0.0, 0.5),
            TimedWord::new("words", 0.5, 1.0),
        ]);
        let output = engine.generate(&input).expect("run");
        assert_eq!(output.modes.chunking, ChunkingMode::Semantic);
        // Everything scores below threshold, so every word stands alone.
        assert_eq!(output.captions.len(), 2);
    }

    #[test]
    fn lexical_scorer_degrades_to_sentence_chunking() {
        let input = TranscriptInput::from_words(vec![
            TimedWord::new("totally", 0.0, 0.4),
            TimedWord::new("disjoint", 0.4, 0.8),
            TimedWord::new("vocabulary", 0.8, 1.4),
        ]);
        let output = engine_with(1).generate(&input).expect("run");
        assert_eq!(output.modes.chunking, ChunkingMode::Sentence);
        assert_eq!(output.captions.len(), 1);
        assert_eq!(output.captions[0].text, "totally disjoint vocabulary");
    }

    #[test]
    fn distribution_matches_caption_labels() {
        let input = TranscriptInput::from_words(sentence_words(&["happy", "happy", "sad"]));
        let output = engine_with(1).generate(&input).expect("run");
        assert_eq!(output.distribution.count(EmotionLabel::Happy), 2);
        assert_eq!(output.distribution.count(EmotionLabel::Sad), 1);
        let happy_pct = output.distribution.percentage(EmotionLabel::Happy);
        assert!((happy_pct - 66.7).abs() < 0.2);
    }
}
