use iso_core::{IsoError, Summator};
use iso_marginal::MarginalSet;
use log::debug;

use crate::candidate::{push_reserved, Candidate, SearchOutcome};
use crate::guard::SearchGuard;

/// Absolute slack on intermediate pruning bounds, whose summation order
/// differs from the final per-row value. Final acceptance is exact.
const PRUNE_SLACK: f64 = 1e-9;

/// Streams every configuration whose log-probability is at least a floor.
///
/// The walk is depth first with element 0 outermost, so rows come out in
/// ascending lexicographic order of their index vectors. A branch is cut as
/// soon as its partial sum plus the best the remaining elements could add
/// falls below the floor; since tables are sorted, every later sibling is cut
/// with it.
#[derive(Debug, Clone)]
pub struct ThresholdGenerator<'a> {
    set: &'a MarginalSet,
    lcutoff: f64,
    limits: Vec<usize>,
    rest_best: Vec<f64>,
    indices: Vec<u32>,
    partial: Vec<f64>,
    started: bool,
    done: bool,
}

impl<'a> ThresholdGenerator<'a> {
    /// Generator over configurations with `lprob >= lcutoff`.
    pub fn new(set: &'a MarginalSet, lcutoff: f64) -> Self {
        let dims = set.dims();
        let modes: Vec<f64> = set.tables().iter().map(|t| t.mode_lprob()).collect();

        // Best achievable contribution of elements strictly after `d`.
        let mut rest_best = vec![0.0; dims];
        for d in (0..dims.saturating_sub(1)).rev() {
            rest_best[d] = rest_best[d + 1] + modes[d + 1];
        }

        let total_best: f64 = modes.iter().sum();
        let limits = set
            .tables()
            .iter()
            .enumerate()
            .map(|(d, table)| {
                let others = total_best - modes[d];
                table.count_above(lcutoff - others - PRUNE_SLACK)
            })
            .collect();

        Self {
            set,
            lcutoff,
            limits,
            rest_best,
            indices: vec![0; dims],
            partial: vec![0.0; dims],
            started: false,
            done: false,
        }
    }

    /// Generator over configurations with probability at least `floor`.
    pub fn absolute(set: &'a MarginalSet, floor: f64) -> Self {
        Self::new(set, floor.ln())
    }

    /// Generator over configurations at least `fraction` times as probable as
    /// the single most probable configuration.
    pub fn relative(set: &'a MarginalSet, fraction: f64) -> Self {
        Self::new(set, fraction.ln() + set.mode_lprob())
    }

    /// Log-probability floor in use.
    pub fn lcutoff(&self) -> f64 {
        self.lcutoff
    }

    /// Per-element candidate counts after the first pruning pass.
    pub fn candidate_counts(&self) -> &[usize] {
        &self.limits
    }

    fn admits(&mut self, depth: usize) -> bool {
        let idx = self.indices[depth] as usize;
        if idx >= self.limits[depth] {
            return false;
        }
        let before = if depth == 0 {
            0.0
        } else {
            self.partial[depth - 1]
        };
        let lprob = before + self.set.table(depth).lprob(idx);
        self.partial[depth] = lprob;
        if depth + 1 == self.indices.len() {
            lprob >= self.lcutoff
        } else {
            lprob + self.rest_best[depth] >= self.lcutoff - PRUNE_SLACK
        }
    }
}

impl Iterator for ThresholdGenerator<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.done {
            return None;
        }
        let dims = self.indices.len();
        if dims == 0 {
            self.done = true;
            let empty = Vec::new().into_boxed_slice();
            return (0.0 >= self.lcutoff).then(|| Candidate::new(empty, 0.0));
        }

        let mut depth = if self.started {
            self.indices[dims - 1] += 1;
            dims - 1
        } else {
            self.started = true;
            0
        };

        loop {
            if self.admits(depth) {
                if depth + 1 == dims {
                    return Some(Candidate::new(
                        self.indices.clone().into_boxed_slice(),
                        self.partial[depth],
                    ));
                }
                depth += 1;
                self.indices[depth] = 0;
                continue;
            }
            if depth == 0 {
                self.done = true;
                return None;
            }
            depth -= 1;
            self.indices[depth] += 1;
        }
    }
}

/// Collects every configuration clearing `lcutoff`.
pub(crate) fn run_threshold(
    set: &MarginalSet,
    mut generator: ThresholdGenerator<'_>,
    row_hint: usize,
    guard: &mut SearchGuard,
) -> Result<SearchOutcome, IsoError> {
    debug!(
        "threshold search: lcutoff={:.6} candidates={:?}",
        generator.lcutoff(),
        generator.candidate_counts()
    );
    let mut covered = Summator::new();
    let mut accepted = Vec::with_capacity(row_hint);
    loop {
        guard.checkpoint()?;
        let Some(candidate) = generator.next() else {
            break;
        };
        debug_assert_eq!(set.lprob(&candidate.indices), candidate.lprob);
        covered.add(candidate.prob());
        push_reserved(&mut accepted, candidate, "threshold-rows")?;
        guard.check_rows(accepted.len())?;
    }
    debug!(
        "threshold search done: rows={} covered={:.12}",
        accepted.len(),
        covered.get()
    );
    Ok(SearchOutcome {
        accepted,
        covered: covered.get(),
        rounds: 0,
        visited: 0,
        exhausted: false,
    })
}
