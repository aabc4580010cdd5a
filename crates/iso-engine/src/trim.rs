use std::cmp::Ordering;

use iso_core::Summator;

use crate::candidate::Candidate;

/// Most probable first; ties by ascending index vector.
pub(crate) fn by_probability(a: &Candidate, b: &Candidate) -> Ordering {
    b.lprob
        .total_cmp(&a.lprob)
        .then_with(|| a.indices.cmp(&b.indices))
}

/// Sorts `accepted` most probable first and drops the tail that is not needed
/// to reach `target`.
///
/// The kept rows are the shortest prefix whose compensated total covers the
/// target, so dropping the least probable kept row would fall short. When the
/// target is never covered every row is kept. Returns the number of rows
/// removed.
pub fn trim_to_target(accepted: &mut Vec<Candidate>, target: f64) -> usize {
    accepted.sort_unstable_by(by_probability);
    let mut covered = Summator::new();
    let mut keep = accepted.len();
    for (idx, candidate) in accepted.iter().enumerate() {
        if covered.covers(target) {
            keep = idx;
            break;
        }
        covered.add(candidate.prob());
    }
    let removed = accepted.len() - keep;
    accepted.truncate(keep);
    removed
}
