use crate::types::{Caption, DistributionSummary};

/// Aggregates the emotion label distribution across the final caption list.
/// Pure; an empty list yields the all-zero summary.
pub fn summarize(captions: &[Caption]) -> DistributionSummary {
    let mut summary = DistributionSummary::default();
    for caption in captions {
        summary.record(caption.emotion.label);
    }
    summary
}
