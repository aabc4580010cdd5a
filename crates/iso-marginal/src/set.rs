use iso_core::{Composition, IsoError};
use log::debug;
use rayon::prelude::*;

use crate::table::{ln_partition_count, partition_count, MarginalTable};

/// Options controlling marginal table construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginalOpts {
    /// Per-element entry cap; `None` disables the check.
    pub max_entries: Option<usize>,
    /// Build tables on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for MarginalOpts {
    fn default() -> Self {
        Self {
            max_entries: Some(10_000_000),
            parallel: true,
        }
    }
}

/// Marginal tables of every element, viewed as one product space.
///
/// A point of the product space is an index vector holding one position per
/// element into that element's sorted table. Index vectors are what the
/// searches move around; counts and masses are only looked up when a row is
/// materialised.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginalSet {
    tables: Vec<MarginalTable>,
}

impl MarginalSet {
    /// Builds one table per element. Element tables are independent, so with
    /// `opts.parallel` they are built concurrently and joined before return.
    pub fn build(composition: &Composition, opts: &MarginalOpts) -> Result<Self, IsoError> {
        let elements = composition.elements();
        let tables = if opts.parallel && elements.len() > 1 {
            elements
                .par_iter()
                .enumerate()
                .map(|(index, element)| MarginalTable::build(index, element, opts.max_entries))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            elements
                .iter()
                .enumerate()
                .map(|(index, element)| MarginalTable::build(index, element, opts.max_entries))
                .collect::<Result<Vec<_>, _>>()?
        };
        debug!(
            "marginal set ready: elements={} ln_space={:.3}",
            tables.len(),
            ln_space_size(&tables)
        );
        Ok(Self { tables })
    }

    /// Wraps already built tables.
    pub fn from_tables(tables: Vec<MarginalTable>) -> Self {
        Self { tables }
    }

    /// Per-element tables in element order.
    pub fn tables(&self) -> &[MarginalTable] {
        &self.tables
    }

    /// Table of element `dim`.
    pub fn table(&self, dim: usize) -> &MarginalTable {
        &self.tables[dim]
    }

    /// Number of elements.
    pub fn dims(&self) -> usize {
        self.tables.len()
    }

    /// Isotope counts per element.
    pub fn isotope_numbers(&self) -> Vec<usize> {
        self.tables.iter().map(MarginalTable::isotope_no).collect()
    }

    /// Width of a flattened configuration row.
    pub fn total_isotopes(&self) -> usize {
        self.tables.iter().map(MarginalTable::isotope_no).sum()
    }

    /// Log-probability of the configuration at `indices`.
    ///
    /// Summed left to right in element order; every strategy goes through
    /// this so equal configurations always get bit-identical values.
    pub fn lprob(&self, indices: &[u32]) -> f64 {
        self.tables
            .iter()
            .zip(indices)
            .fold(0.0, |acc, (table, &idx)| acc + table.lprob(idx as usize))
    }

    /// Mass of the configuration at `indices`.
    pub fn mass(&self, indices: &[u32]) -> f64 {
        self.tables
            .iter()
            .zip(indices)
            .fold(0.0, |acc, (table, &idx)| acc + table.mass(idx as usize))
    }

    /// Appends the concatenated isotope counts for `indices` to `out`.
    pub fn extend_counts(&self, indices: &[u32], out: &mut Vec<u32>) {
        for (table, &idx) in self.tables.iter().zip(indices) {
            out.extend_from_slice(table.counts(idx as usize));
        }
    }

    /// Log-probability of the single most probable configuration.
    pub fn mode_lprob(&self) -> f64 {
        self.tables
            .iter()
            .fold(0.0, |acc, table| acc + table.mode_lprob())
    }

    /// Returns true if `indices[dim] + 1` is still inside that element's table.
    pub fn can_advance(&self, indices: &[u32], dim: usize) -> bool {
        (indices[dim] as usize + 1) < self.tables[dim].len()
    }

    /// Exact size of the full configuration space, if it fits in `u128`.
    pub fn space_size(&self) -> Option<u128> {
        self.tables.iter().try_fold(1u128, |acc, table| {
            acc.checked_mul(partition_count(table.atom_count(), table.isotope_no())?)
        })
    }

    /// Natural log of the configuration space size.
    pub fn ln_space_size(&self) -> f64 {
        ln_space_size(&self.tables)
    }
}

fn ln_space_size(tables: &[MarginalTable]) -> f64 {
    tables
        .iter()
        .map(|table| ln_partition_count(table.atom_count(), table.isotope_no()))
        .sum()
}
