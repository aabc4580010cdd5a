use iso_core::IsoError;

/// A point of the product space together with its log-probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// One position per element into that element's sorted marginal table.
    pub indices: Box<[u32]>,
    /// Log-probability of the configuration.
    pub lprob: f64,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(indices: Box<[u32]>, lprob: f64) -> Self {
        Self { indices, lprob }
    }

    /// Probability of the configuration.
    pub fn prob(&self) -> f64 {
        self.lprob.exp()
    }

    /// Copy of the indices with `dim` moved one step down its table.
    pub fn successor(&self, dim: usize) -> Box<[u32]> {
        let mut next = self.indices.clone();
        next[dim] += 1;
        next
    }
}

/// Pushes onto `buf`, turning a failed growth into `AllocationFailure`.
pub(crate) fn push_reserved<T>(buf: &mut Vec<T>, item: T, name: &str) -> Result<(), IsoError> {
    if buf.len() == buf.capacity() {
        let extra = buf.len().max(16);
        buf.try_reserve(extra)
            .map_err(|err| IsoError::allocation(name, buf.len() + extra, err))?;
    }
    buf.push(item);
    Ok(())
}

/// Raw result of a strategy run, before trimming and materialisation.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchOutcome {
    pub accepted: Vec<Candidate>,
    pub covered: f64,
    pub rounds: usize,
    pub visited: usize,
    pub exhausted: bool,
}
