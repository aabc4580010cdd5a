//! Round-based frontier expansion.
//!
//! The engine keeps an accepted set and a fringe of discovered but not yet
//! accepted neighbours. Each round a [`ThresholdPolicy`] picks a
//! log-probability threshold from the fringe, and everything reachable at or
//! above it is accepted. Because the index space is a down-set under the
//! sorted tables, the accepted set after a round is exactly the set of
//! configurations at or above that round's threshold.

use std::mem;

use iso_core::{DedupIndex, IsoError, Summator};
use iso_marginal::MarginalSet;
use log::debug;

use crate::candidate::{push_reserved, Candidate, SearchOutcome};
use crate::guard::SearchGuard;
use crate::policy::ThresholdPolicy;

/// Position of a [`LayeredEngine`] in its state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Nothing accepted yet.
    Seed,
    /// Waiting for the next threshold.
    Expanding,
    /// Accepting everything at or above the carried threshold.
    Thresholding(f64),
    /// Target met or space exhausted.
    Converged,
}

/// Buffer sizing and caps for a [`LayeredEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSizing {
    /// Initial capacity of the accepted and fringe buffers.
    pub table_size_hint: usize,
    /// Initial capacity of the visited-state index.
    pub hash_size_hint: usize,
    /// Cap on distinct index vectors.
    pub max_states: Option<usize>,
}

impl Default for EngineSizing {
    fn default() -> Self {
        Self {
            table_size_hint: 1000,
            hash_size_hint: 1000,
            max_states: None,
        }
    }
}

/// Frontier search driven by a threshold policy.
#[derive(Debug)]
pub struct LayeredEngine<'a, P: ThresholdPolicy> {
    set: &'a MarginalSet,
    policy: P,
    target: f64,
    phase: Phase,
    visited: DedupIndex<Box<[u32]>>,
    accepted: Vec<Candidate>,
    fringe: Vec<Candidate>,
    scratch: Vec<f64>,
    covered: Summator,
    rounds: usize,
    exhausted: bool,
}

impl<'a, P: ThresholdPolicy> LayeredEngine<'a, P> {
    /// Engine in the [`Phase::Seed`] state.
    pub fn new(set: &'a MarginalSet, policy: P, target: f64, sizing: EngineSizing) -> Self {
        Self {
            set,
            policy,
            target,
            phase: Phase::Seed,
            visited: DedupIndex::new(sizing.hash_size_hint, sizing.max_states),
            accepted: Vec::with_capacity(sizing.table_size_hint),
            fringe: Vec::with_capacity(sizing.table_size_hint),
            scratch: Vec::new(),
            covered: Summator::new(),
            rounds: 0,
            exhausted: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Probability accepted so far.
    pub fn covered(&self) -> f64 {
        self.covered.get()
    }

    /// Completed thresholding rounds.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Configurations accepted so far, in acceptance order.
    pub fn accepted(&self) -> &[Candidate] {
        &self.accepted
    }

    /// Discovered configurations not yet accepted.
    pub fn fringe_len(&self) -> usize {
        self.fringe.len()
    }

    /// The policy, with whatever state it has gathered.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Performs one state transition and returns the new phase.
    pub fn step(&mut self, guard: &mut SearchGuard) -> Result<Phase, IsoError> {
        self.phase = match self.phase {
            Phase::Seed => self.seed(guard)?,
            Phase::Expanding => self.expand(guard)?,
            Phase::Thresholding(threshold) => self.threshold(threshold, guard)?,
            Phase::Converged => Phase::Converged,
        };
        Ok(self.phase)
    }

    /// Steps until converged and hands back the accepted set.
    pub(crate) fn run(mut self, guard: &mut SearchGuard) -> Result<SearchOutcome, IsoError> {
        while self.step(guard)? != Phase::Converged {}
        debug!(
            "layered search done: rows={} rounds={} visited={} fringe={} covered={:.12}",
            self.accepted.len(),
            self.rounds,
            self.visited.len(),
            self.fringe.len(),
            self.covered.get()
        );
        Ok(SearchOutcome {
            covered: self.covered.get(),
            rounds: self.rounds,
            visited: self.visited.len(),
            exhausted: self.exhausted,
            accepted: self.accepted,
        })
    }

    fn after_round(&self) -> Phase {
        if self.covered.covers(self.target) {
            Phase::Converged
        } else {
            Phase::Expanding
        }
    }

    fn seed(&mut self, guard: &mut SearchGuard) -> Result<Phase, IsoError> {
        guard.checkpoint_round()?;
        let origin: Box<[u32]> = vec![0u32; self.set.dims()].into_boxed_slice();
        self.visited.insert(origin.clone())?;
        let lprob = self.set.lprob(&origin);
        let seed = Candidate::new(origin, lprob);
        self.accept(seed.clone(), guard)?;
        self.policy.observe(lprob, self.covered.get());
        if self.after_round() == Phase::Converged {
            return Ok(Phase::Converged);
        }

        let mut discovered = Vec::new();
        self.discover(&seed, &mut discovered)?;
        for candidate in discovered {
            push_reserved(&mut self.fringe, candidate, "layered-fringe")?;
        }
        debug!(
            "layered seed: lprob={:.6} fringe={}",
            lprob,
            self.fringe.len()
        );
        Ok(self.after_round())
    }

    fn expand(&mut self, guard: &mut SearchGuard) -> Result<Phase, IsoError> {
        guard.checkpoint_round()?;
        if self.fringe.is_empty() {
            self.exhausted = true;
            return Ok(Phase::Converged);
        }
        self.scratch.clear();
        self.scratch
            .try_reserve(self.fringe.len())
            .map_err(|err| IsoError::allocation("layered-scratch", self.fringe.len(), err))?;
        self.scratch.extend(self.fringe.iter().map(|c| c.lprob));
        let threshold =
            self.policy
                .next_threshold(&mut self.scratch, self.covered.get(), self.target);
        Ok(Phase::Thresholding(threshold))
    }

    fn threshold(&mut self, threshold: f64, guard: &mut SearchGuard) -> Result<Phase, IsoError> {
        let (mut stack, mut next_fringe): (Vec<_>, Vec<_>) = mem::take(&mut self.fringe)
            .into_iter()
            .partition(|c| c.lprob >= threshold);
        let before = self.accepted.len();
        let mut discovered = Vec::new();

        while let Some(candidate) = stack.pop() {
            guard.checkpoint()?;
            discovered.clear();
            self.discover(&candidate, &mut discovered)?;
            for child in discovered.drain(..) {
                if child.lprob >= threshold {
                    push_reserved(&mut stack, child, "layered-stack")?;
                } else {
                    push_reserved(&mut next_fringe, child, "layered-fringe")?;
                }
            }
            self.accept(candidate, guard)?;
        }

        self.fringe = next_fringe;
        self.rounds += 1;
        self.policy.observe(threshold, self.covered.get());
        debug!(
            "layered round {}: threshold={:.6} accepted={} fringe={} covered={:.12}",
            self.rounds,
            threshold,
            self.accepted.len() - before,
            self.fringe.len(),
            self.covered.get()
        );
        Ok(self.after_round())
    }

    fn accept(&mut self, candidate: Candidate, guard: &SearchGuard) -> Result<(), IsoError> {
        self.covered.add(candidate.prob());
        push_reserved(&mut self.accepted, candidate, "layered-rows")?;
        guard.check_rows(self.accepted.len())
    }

    /// Appends the not yet visited neighbours of `from` to `out`.
    fn discover(&mut self, from: &Candidate, out: &mut Vec<Candidate>) -> Result<(), IsoError> {
        for dim in 0..self.set.dims() {
            if !self.set.can_advance(&from.indices, dim) {
                continue;
            }
            let child = from.successor(dim);
            if self.visited.insert(child.clone())? {
                let lprob = self.set.lprob(&child);
                push_reserved(out, Candidate::new(child, lprob), "layered-discovered")?;
            }
        }
        Ok(())
    }
}
