//! Collapsing several annotators' answers into one training label.

use potato_core::config::ResolutionStrategy;
use potato_core::models::LabelAnnotation;
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick the annotation used for training. `None` only for an empty slice.
///
/// `Random` draws one annotator uniformly. `Majority` takes the most
/// frequent identical annotation, ties going to the earliest.
pub fn resolve_annotations<'a, R: Rng>(
    annotations: &[&'a LabelAnnotation],
    strategy: ResolutionStrategy,
    rng: &mut R,
) -> Option<&'a LabelAnnotation> {
    match strategy {
        ResolutionStrategy::Random => annotations.choose(rng).copied(),
        ResolutionStrategy::Majority => {
            let mut best: Option<(&LabelAnnotation, usize)> = None;
            for candidate in annotations {
                let votes = annotations.iter().filter(|a| **a == *candidate).count();
                if best.map_or(true, |(_, b)| votes > b) {
                    best = Some((*candidate, votes));
                }
            }
            best.map(|(a, _)| a)
        }
    }
}
