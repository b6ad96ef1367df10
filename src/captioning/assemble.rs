use crate::error::CaptionError;
use crate::types::{Caption, Chunk, EmotionResult};

/// Minimum separation enforced between adjacent captions, in seconds.
const OVERLAP_EPSILON_SECS: f64 = 0.001;

/// Pairs chunks with their emotion results positionally and produces the
/// final caption list.
///
/// A count mismatch is a pipeline bug and fails hard. Chunks whose text is
/// empty after trimming are dropped with a warning. Overlapping neighbours
/// are repaired by truncating the earlier caption's end to 1 ms before the
/// later caption's start; captions are never reordered.
pub fn assemble(
    chunks: &[Chunk],
    emotions: &[EmotionResult],
) -> Result<Vec<Caption>, CaptionError> {
    if chunks.len() != emotions.len() {
        return Err(CaptionError::LengthMismatch {
            chunks: chunks.len(),
            emotions: emotions.len(),
        });
    }

    let mut captions: Vec<Caption> = Vec::with_capacity(chunks.len());
    for (chunk, emotion) in chunks.iter().zip(emotions.iter()) {
        let text = chunk.text.trim();
        if text.is_empty() {
            tracing::warn!(
                start = chunk.start,
                end = chunk.end,
                "dropping chunk with empty text"
            );
            continue;
        }
        captions.push(Caption {
            start: chunk.start,
            end: chunk.end,
            text: text.to_string(),
            emotion: *emotion,
        });
    }

    for i in 0..captions.len().saturating_sub(1) {
        let next_start = captions[i + 1].start;
        if captions[i].end > next_start {
            captions[i].end = next_start - OVERLAP_EPSILON_SECS;
        }
    }

    // Clamping against a tightly packed neighbour can collapse a caption to
    // a non-positive span; such captions are undisplayable and dropped.
    captions.retain(|c| {
        if c.start < c.end {
            return true;
        }
        tracing::warn!(
            start = c.start,
            end = c.end,
            text = %c.text,
            "dropping caption collapsed by overlap repair"
        );
        false
    });

    Ok(captions)
}
