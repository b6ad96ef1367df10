use crate::types::{EmotionLabel, EmotionResult};

const MIN_CONFIDENCE: f32 = 0.5;
const MAX_CONFIDENCE: f32 = 0.95;

/// Keyword/phrase cues per label. Neutral has no cues; it is the resolution
/// for ties and cue-free text.
const KEYWORDS: [(EmotionLabel, &[&str]); 6] = [
    (
        EmotionLabel::Happy,
        &[
            "happy",
            "joy",
            "laugh",
            "smile",
            "great",
            "amazing",
            "awesome",
            "wonderful",
            "love",
            "excited",
        ],
    ),
    (
        EmotionLabel::Sad,
        &[
            "sad",
            "cry",
            "crying",
            "tears",
            "terrible",
            "awful",
            "unhappy",
            "lonely",
            "heartbroken",
        ],
    ),
    (
        EmotionLabel::Angry,
        &["angry", "mad", "rage", "hate", "furious", "annoyed", "outraged"],
    ),
    (
        EmotionLabel::Fear,
        &[
            "fear",
            "afraid",
            "scared",
            "terrified",
            "worried",
            "nervous",
            "panic",
        ],
    ),
    (
        EmotionLabel::Disgust,
        &["disgust", "disgusting", "gross", "nasty", "revolting", "sick of"],
    ),
    (
        EmotionLabel::Surprise,
        &[
            "wow",
            "surprise",
            "surprised",
            "shocked",
            "incredible",
            "unbelievable",
            "no way",
        ],
    ),
];

/// Heuristic emotion classification by keyword counting.
///
/// The label with the most cue hits wins; confidence grows with the margin
/// over the runner-up and stays inside [0.5, 0.95]. Ties and cue-free text
/// resolve to neutral at 0.5.
pub fn classify_by_keywords(text: &str) -> EmotionResult {
    if text.trim().is_empty() {
        return EmotionResult::neutral();
    }

    let normalized = text.to_lowercase();
    let words: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();

    let mut scores: Vec<(EmotionLabel, usize)> = KEYWORDS
        .iter()
        .map(|(label, cues)| {
            let hits: usize = cues
                .iter()
                .map(|cue| count_cue(&normalized, &words, cue))
                .sum();
            (*label, hits)
        })
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (top_label, top) = scores[0];
    let runner_up = scores[1].1;
    if top == 0 || top == runner_up {
        return EmotionResult::neutral();
    }

    let margin_share = (top - runner_up) as f32 / top as f32;
    let confidence =
        (MIN_CONFIDENCE + (MAX_CONFIDENCE - MIN_CONFIDENCE) * margin_share).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    EmotionResult::new(top_label, confidence)
}

/// Single-word cues match whole words only (so "mad" does not fire inside
/// "made"); multi-word phrases match as substrings of the normalized text.
fn count_cue(normalized: &str, words: &[&str], cue: &str) -> usize {
    if cue.contains(' ') {
        normalized.matches(cue).count()
    } else {
        words.iter().filter(|w| **w == cue).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_text_is_happy_with_floor_confidence() {
        let result = classify_by_keywords("I am so happy today");
        assert_eq!(result.label, EmotionLabel::Happy);
        assert!(result.confidence >= 0.5);
    }

    #[test]
    fn uncontested_cue_gets_max_confidence() {
        let result = classify_by_keywords("that is absolutely disgusting");
        assert_eq!(result.label, EmotionLabel::Disgust);
        assert!((result.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn empty_and_whitespace_are_neutral_half() {
        for text in ["", "   ", "\t\n"] {
            let result = classify_by_keywords(text);
            assert_eq!(result.label, EmotionLabel::Neutral);
            assert_eq!(result.confidence, 0.5);
        }
    }

    #[test]
    fn cue_free_text_is_neutral() {
        let result = classify_by_keywords("the meeting starts at nine");
        assert_eq!(result.label, EmotionLabel::Neutral);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn tied_cues_resolve_to_neutral() {
        // One happy cue against one sad cue.
        let result = classify_by_keywords("happy then sad");
        assert_eq!(result.label, EmotionLabel::Neutral);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn margin_raises_confidence() {
        let weak = classify_by_keywords("happy but also a bit sad and sad again and happy happy");
        let strong = classify_by_keywords("happy happy happy");
        assert_eq!(weak.label, EmotionLabel::Happy);
        assert_eq!(strong.label, EmotionLabel::Happy);
        assert!(strong.confidence > weak.confidence);
    }

    #[test]
    fn single_word_cues_do_not_fire_inside_words() {
        // "mad" must not match "made", "sad" must not match "saddle".
        let result = classify_by_keywords("we made a saddle");
        assert_eq!(result.label, EmotionLabel::Neutral);
    }

    #[test]
    fn phrase_cue_matches_across_words() {
        let result = classify_by_keywords("no way that just happened");
        assert_eq!(result.label, EmotionLabel::Surprise);
    }

    #[test]
    fn case_is_ignored() {
        let result = classify_by_keywords("I HATE this");
        assert_eq!(result.label, EmotionLabel::Angry);
    }
}
