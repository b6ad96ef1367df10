use crate::config::CaptionConfig;
use crate::pipeline::traits::SimilarityScorer;
use crate::types::{Chunk, TimedWord};

const SENTENCE_ENDINGS: [char; 3] = ['.', '!', '?'];

/// Groups a sanitized word sequence into semantic chunks.
///
/// An open buffer accumulates words; each candidate word either extends the
/// buffer (similar enough and no hard boundary fired) or closes it and
/// starts the next chunk. The similarity unit is the buffer's accumulated
/// text against the candidate word's text. The final buffer is always
/// flushed, so no input word is ever lost.
pub fn chunk_words(
    words: &[TimedWord],
    scorer: &dyn SimilarityScorer,
    config: &CaptionConfig,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<TimedWord> = Vec::new();

    for word in words {
        if buffer.is_empty() {
            buffer.push(word.clone());
            continue;
        }

        if let Some(reason) = hard_boundary(&buffer, word, config) {
            tracing::debug!(
                reason,
                chunk_words = buffer.len(),
                at = word.start,
                "closing chunk on hard boundary"
            );
            flush(&mut buffer, &mut chunks);
            buffer.push(word.clone());
            continue;
        }

        let buffer_text = buffer
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let similarity = scorer.similarity(&buffer_text, &word.text);
        if f64::from(similarity) >= config.similarity_threshold {
            buffer.push(word.clone());
        } else {
            tracing::debug!(
                similarity,
                threshold = config.similarity_threshold,
                at = word.start,
                "closing chunk on similarity drop"
            );
            flush(&mut buffer, &mut chunks);
            buffer.push(word.clone());
        }
    }

    flush(&mut buffer, &mut chunks);
    chunks
}

/// Hard-boundary-only chunking: the degraded form of semantic chunking
/// used when no embedding scorer is available.
///
/// Lexical overlap between a buffer and a single candidate word is too
/// weak a signal to split on (nearly every continuation word is disjoint
/// from the buffer), so degraded runs keep pause, punctuation and size
/// caps as the only boundaries. Equivalent to `chunk_words` with every
/// continuation scored as maximally similar.
pub fn sentence_chunks(words: &[TimedWord], config: &CaptionConfig) -> Vec<Chunk> {
    struct AlwaysSimilar;

    impl SimilarityScorer for AlwaysSimilar {
        fn similarity(&self, _a: &str, _b: &str) -> f32 {
            1.0
        }

        fn mode(&self) -> crate::types::ScorerMode {
            crate::types::ScorerMode::Lexical
        }
    }

    chunk_words(words, &AlwaysSimilar, config)
}

/// Signals that close the open buffer regardless of semantic similarity.
fn hard_boundary(
    buffer: &[TimedWord],
    candidate: &TimedWord,
    config: &CaptionConfig,
) -> Option<&'static str> {
    let previous = buffer.last()?;
    let first = buffer.first()?;

    if previous
        .text
        .trim_end()
        .ends_with(SENTENCE_ENDINGS)
    {
        return Some("sentence punctuation");
    }
    if candidate.start - previous.end > config.pause_gap_secs {
        return Some("pause gap");
    }
    if buffer.len() >= config.max_chunk_words {
        return Some("max words");
    }
    if candidate.end - first.start > config.max_chunk_duration_secs {
        return Some("max duration");
    }
    None
}

fn flush(buffer: &mut Vec<TimedWord>, chunks: &mut Vec<Chunk>) {
    if buffer.is_empty() {
        return;
    }
    if let Some(chunk) = Chunk::from_words(std::mem::take(buffer)) {
        chunks.push(chunk);
    }
}
