pub mod assemble;
pub mod chunking;
pub mod report;
pub mod windowing;

use crate::types::TimedWord;

/// Drops words that violate the timing contract (`start <= end`, start
/// non-decreasing across the sequence) before chunking. Malformed words are
/// a recognizer defect; losing one word beats aborting the transcript.
pub fn sanitize_timing(words: &[TimedWord]) -> Vec<TimedWord> {
    let mut kept: Vec<TimedWord> = Vec::with_capacity(words.len());
    let mut last_start = f64::NEG_INFINITY;
    for word in words {
        if word.start > word.end {
            tracing::warn!(
                word = %word.text,
                start = word.start,
                end = word.end,
                "dropping word with inverted timing"
            );
            continue;
        }
        if word.start < last_start {
            tracing::warn!(
                word = %word.text,
                start = word.start,
                previous_start = last_start,
                "dropping out-of-order word"
            );
            continue;
        }
        last_start = word.start;
        kept.push(word.clone());
    }
    kept
}
