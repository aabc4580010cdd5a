use iso_core::{ErrorInfo, IsoError, Summator};
use iso_marginal::MarginalSet;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Materialised query result: three row-aligned arrays.
///
/// Row `i` has mass `masses[i]`, log-probability `lprobs[i]` and isotope
/// counts `counts[i * width .. (i + 1) * width]`, where `width` is the total
/// isotope count across elements and columns are grouped by element in input
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoDistribution {
    isotope_numbers: Vec<usize>,
    masses: Vec<f64>,
    lprobs: Vec<f64>,
    counts: Vec<u32>,
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isotopologue<'a> {
    /// Summed isotope mass.
    pub mass: f64,
    /// Natural log of the probability.
    pub lprob: f64,
    counts: &'a [u32],
    isotope_numbers: &'a [usize],
}

impl<'a> Isotopologue<'a> {
    /// Probability of the configuration.
    pub fn prob(&self) -> f64 {
        self.lprob.exp()
    }

    /// Flattened isotope counts.
    pub fn counts(&self) -> &'a [u32] {
        self.counts
    }

    /// Isotope counts of each element.
    pub fn element_counts(&self) -> Vec<&'a [u32]> {
        split_row(self.counts, self.isotope_numbers)
    }
}

fn split_row<'a>(mut row: &'a [u32], isotope_numbers: &[usize]) -> Vec<&'a [u32]> {
    let mut parts = Vec::with_capacity(isotope_numbers.len());
    for &n in isotope_numbers {
        let (head, tail) = row.split_at(n);
        parts.push(head);
        row = tail;
    }
    parts
}

fn malformed(message: &str, rows: usize, found: usize) -> IsoError {
    IsoError::Serde(
        ErrorInfo::new("malformed-distribution", message)
            .with_context("rows", rows)
            .with_context("found", found),
    )
}

impl IsoDistribution {
    /// Empty distribution over the given element layout.
    pub fn empty(isotope_numbers: Vec<usize>) -> Self {
        Self {
            isotope_numbers,
            masses: Vec::new(),
            lprobs: Vec::new(),
            counts: Vec::new(),
        }
    }

    /// Assembles a distribution from raw arrays, checking their alignment.
    pub fn from_parts(
        isotope_numbers: Vec<usize>,
        masses: Vec<f64>,
        lprobs: Vec<f64>,
        counts: Vec<u32>,
    ) -> Result<Self, IsoError> {
        let dist = Self {
            isotope_numbers,
            masses,
            lprobs,
            counts,
        };
        dist.validate()?;
        Ok(dist)
    }

    /// Checks that the three arrays describe the same rows.
    pub fn validate(&self) -> Result<(), IsoError> {
        if self.masses.len() != self.lprobs.len() {
            return Err(malformed(
                "mass and log-probability arrays differ in length",
                self.masses.len(),
                self.lprobs.len(),
            ));
        }
        let expected = self.masses.len().checked_mul(self.width());
        if expected != Some(self.counts.len()) {
            return Err(malformed(
                "count matrix does not match row count and width",
                self.masses.len(),
                self.counts.len(),
            ));
        }
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Returns true when no configuration was accepted.
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Columns per count row.
    pub fn width(&self) -> usize {
        self.isotope_numbers.iter().sum()
    }

    /// Isotope count of each element.
    pub fn isotope_numbers(&self) -> &[usize] {
        &self.isotope_numbers
    }

    /// Row masses.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Row log-probabilities.
    pub fn lprobs(&self) -> &[f64] {
        &self.lprobs
    }

    /// Row probabilities.
    pub fn probs(&self) -> Vec<f64> {
        self.lprobs.iter().map(|lp| lp.exp()).collect()
    }

    /// Flattened count matrix, row major.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count row `i`.
    pub fn row(&self, i: usize) -> &[u32] {
        let width = self.width();
        &self.counts[i * width..(i + 1) * width]
    }

    /// Count row `i` split per element.
    pub fn row_split(&self, i: usize) -> Vec<&[u32]> {
        split_row(self.row(i), &self.isotope_numbers)
    }

    /// Count rows as owned vectors.
    pub fn count_rows(&self) -> Vec<Vec<u32>> {
        (0..self.len()).map(|i| self.row(i).to_vec()).collect()
    }

    /// Compensated sum of row probabilities.
    pub fn total_prob(&self) -> f64 {
        self.lprobs.iter().map(|lp| lp.exp()).collect::<Summator>().get()
    }

    /// Row `i` as a borrowed view.
    pub fn get(&self, i: usize) -> Option<Isotopologue<'_>> {
        if i >= self.len() {
            return None;
        }
        Some(Isotopologue {
            mass: self.masses[i],
            lprob: self.lprobs[i],
            counts: self.row(i),
            isotope_numbers: &self.isotope_numbers,
        })
    }

    /// Iterates over rows in stored order.
    pub fn iter(&self) -> impl Iterator<Item = Isotopologue<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// Converts accepted candidates into the three-array result, in the given order.
pub(crate) fn materialize(
    set: &MarginalSet,
    accepted: &[Candidate],
) -> Result<IsoDistribution, IsoError> {
    let rows = accepted.len();
    let width = set.total_isotopes();
    let mut masses = Vec::new();
    let mut lprobs = Vec::new();
    let mut counts = Vec::new();
    masses
        .try_reserve_exact(rows)
        .map_err(|err| IsoError::allocation("result-masses", rows, err))?;
    lprobs
        .try_reserve_exact(rows)
        .map_err(|err| IsoError::allocation("result-lprobs", rows, err))?;
    let cells = rows.saturating_mul(width);
    counts
        .try_reserve_exact(cells)
        .map_err(|err| IsoError::allocation("result-counts", cells, err))?;

    for candidate in accepted {
        masses.push(set.mass(&candidate.indices));
        lprobs.push(candidate.lprob);
        set.extend_counts(&candidate.indices, &mut counts);
    }

    Ok(IsoDistribution {
        isotope_numbers: set.isotope_numbers(),
        masses,
        lprobs,
        counts,
    })
}
