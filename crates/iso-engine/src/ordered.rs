//! Best-first merge of the sorted marginal tables.
//!
//! The product space is an implicit DAG: moving one element's index one step
//! down its table never increases the log-probability. Popping states from a
//! max-heap and pushing their successors therefore yields configurations in
//! non-increasing probability without touching the rest of the space.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use iso_core::{DedupIndex, IsoError, Summator};
use iso_marginal::MarginalSet;
use log::debug;

use crate::candidate::{push_reserved, Candidate, SearchOutcome};
use crate::guard::SearchGuard;

#[derive(Debug)]
struct HeapEntry(Candidate);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Ties pop the lexicographically smaller index vector first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .lprob
            .total_cmp(&other.0.lprob)
            .then_with(|| other.0.indices.cmp(&self.0.indices))
    }
}

/// Streams configurations in non-increasing probability.
///
/// Equal probabilities come out in ascending lexicographic order of their
/// index vectors, so the sequence is fully determined by the input.
#[derive(Debug)]
pub struct OrderedGenerator<'a> {
    set: &'a MarginalSet,
    heap: BinaryHeap<HeapEntry>,
    visited: DedupIndex<Box<[u32]>>,
    // Last state handed out; its successors are queued on the next pull.
    unexpanded: Option<Candidate>,
    failed: bool,
}

impl<'a> OrderedGenerator<'a> {
    /// Seeds the queue with the all-zero index vector.
    pub fn new(
        set: &'a MarginalSet,
        hash_size_hint: usize,
        max_states: Option<usize>,
    ) -> Result<Self, IsoError> {
        let mut visited = DedupIndex::new(hash_size_hint, max_states);
        let origin: Box<[u32]> = vec![0u32; set.dims()].into_boxed_slice();
        visited.insert(origin.clone())?;
        let lprob = set.lprob(&origin);
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry(Candidate::new(origin, lprob)));
        Ok(Self {
            set,
            heap,
            visited,
            unexpanded: None,
            failed: false,
        })
    }

    /// Distinct index vectors discovered so far.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    /// States waiting in the queue.
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    fn expand(&mut self, top: &Candidate) -> Result<(), IsoError> {
        for dim in 0..self.set.dims() {
            if !self.set.can_advance(&top.indices, dim) {
                continue;
            }
            let child = top.successor(dim);
            if self.visited.insert(child.clone())? {
                let lprob = self.set.lprob(&child);
                self.heap.try_reserve(1).map_err(|err| {
                    IsoError::allocation("ordered-heap", self.heap.len() + 1, err)
                })?;
                self.heap.push(HeapEntry(Candidate::new(child, lprob)));
            }
        }
        Ok(())
    }
}

impl Iterator for OrderedGenerator<'_> {
    type Item = Result<Candidate, IsoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(previous) = self.unexpanded.take() {
            if let Err(err) = self.expand(&previous) {
                self.failed = true;
                return Some(Err(err));
            }
        }
        let HeapEntry(top) = self.heap.pop()?;
        self.unexpanded = Some(top.clone());
        Some(Ok(top))
    }
}

/// Pops configurations until their summed probability covers `target`.
pub(crate) fn run_ordered(
    set: &MarginalSet,
    target: f64,
    hash_size_hint: usize,
    row_hint: usize,
    max_states: Option<usize>,
    guard: &mut SearchGuard,
) -> Result<SearchOutcome, IsoError> {
    let mut generator = OrderedGenerator::new(set, hash_size_hint, max_states)?;
    let mut covered = Summator::new();
    let mut accepted = Vec::with_capacity(row_hint);
    let mut exhausted = false;

    while !covered.covers(target) {
        guard.checkpoint()?;
        let Some(next) = generator.next() else {
            exhausted = true;
            break;
        };
        let candidate = next?;
        covered.add(candidate.prob());
        push_reserved(&mut accepted, candidate, "ordered-rows")?;
        guard.check_rows(accepted.len())?;
    }

    debug!(
        "ordered search done: rows={} visited={} pending={} covered={:.12}",
        accepted.len(),
        generator.visited(),
        generator.pending(),
        covered.get()
    );

    Ok(SearchOutcome {
        accepted,
        covered: covered.get(),
        rounds: 0,
        visited: generator.visited(),
        exhausted,
    })
}
