use crate::types::{Chunk, TimedWord};

/// Fixed-duration chunking used when semantic chunking is disabled.
///
/// Words are grouped into consecutive wall-clock windows of `window_secs`,
/// anchored at each window's first word. A word opens a new window when its
/// start falls at or past the current anchor plus the window length.
pub fn window_words(words: &[TimedWord], window_secs: f64) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<TimedWord> = Vec::new();
    let mut anchor = 0.0f64;

    for word in words {
        if buffer.is_empty() {
            anchor = word.start;
            buffer.push(word.clone());
            continue;
        }
        if word.start >= anchor + window_secs {
            if let Some(chunk) = Chunk::from_words(std::mem::take(&mut buffer)) {
                chunks.push(chunk);
            }
            anchor = word.start;
        }
        buffer.push(word.clone());
    }

    if let Some(chunk) = Chunk::from_words(buffer) {
        chunks.push(chunk);
    }
    chunks
}
