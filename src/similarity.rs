use std::collections::HashSet;

/// Token-overlap (Jaccard) similarity over lowercased word sets.
///
/// Two empty strings score 1.0: with no tokens there is no disagreement,
/// and treating them as maximally similar avoids forcing a spurious
/// single-word chunk at the boundary.
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let set_a: HashSet<String> = tokenize_lower(a);
    let set_b: HashSet<String> = tokenize_lower(b);

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }
    intersection as f32 / union as f32
}

fn tokenize_lower(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Cosine similarity clamped into [0, 1]; negative cosine maps to 0.
/// Zero-magnitude vectors score 0 rather than dividing by zero.
pub fn clamped_cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
