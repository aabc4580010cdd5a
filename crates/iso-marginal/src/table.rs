use iso_core::{Element, ErrorInfo, IsoError, Summator};
use log::debug;
use statrs::function::gamma::ln_gamma;

/// Sorted table of every isotope-count vector of a single element.
///
/// Entry `i` is the `i`-th most probable sub-isotopologue. Ties in
/// log-probability keep enumeration order, which is descending lexicographic
/// order on the count vector, so the table is identical across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginalTable {
    atom_count: u32,
    isotope_no: usize,
    isotope_masses: Vec<f64>,
    isotope_probs: Vec<f64>,
    counts: Vec<u32>,
    lprobs: Vec<f64>,
    masses: Vec<f64>,
}

/// Number of ways to split `atoms` among `isotopes` bins, if it fits in `u128`.
pub fn partition_count(atoms: u32, isotopes: usize) -> Option<u128> {
    if isotopes == 0 {
        return Some(u128::from(atoms == 0));
    }
    let n = u128::from(atoms) + isotopes as u128 - 1;
    let r = (isotopes as u128 - 1).min(u128::from(atoms));
    let mut result: u128 = 1;
    for i in 1..=r {
        result = result.checked_mul(n - r + i)? / i;
    }
    Some(result)
}

/// Natural log of [`partition_count`], finite for any input.
pub fn ln_partition_count(atoms: u32, isotopes: usize) -> f64 {
    if isotopes <= 1 {
        return 0.0;
    }
    let n = f64::from(atoms);
    let k = isotopes as f64;
    ln_gamma(n + k) - ln_gamma(n + 1.0) - ln_gamma(k)
}

/// `ln(k!)`, exact zero for `k < 2`.
fn ln_factorial(k: u32) -> f64 {
    if k < 2 {
        0.0
    } else {
        ln_gamma(f64::from(k) + 1.0)
    }
}

fn enumerate_partitions<F: FnMut(&[u32])>(atoms: u32, isotopes: usize, visit: &mut F) {
    let mut counts = vec![0u32; isotopes];
    if isotopes == 0 {
        visit(&counts);
        return;
    }
    fill(&mut counts, 0, atoms, visit);
}

fn fill<F: FnMut(&[u32])>(counts: &mut [u32], pos: usize, remaining: u32, visit: &mut F) {
    if pos + 1 == counts.len() {
        counts[pos] = remaining;
        visit(counts);
        return;
    }
    for c in (0..=remaining).rev() {
        counts[pos] = c;
        fill(counts, pos + 1, remaining - c, visit);
    }
}

fn reserve<T>(buf: &mut Vec<T>, name: &str, len: usize) -> Result<(), IsoError> {
    buf.try_reserve_exact(len)
        .map_err(|err| IsoError::allocation(name, len, err))
}

impl MarginalTable {
    /// Enumerates and sorts every sub-isotopologue of `element`.
    ///
    /// `index` is the element position, used only in diagnostics. Fails with
    /// `ResourceExhausted` when the table would exceed `max_entries`.
    pub fn build(
        index: usize,
        element: &Element,
        max_entries: Option<usize>,
    ) -> Result<Self, IsoError> {
        let atoms = element.atom_count();
        let isotope_no = element.isotope_count();
        let entries = partition_count(atoms, isotope_no)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| max_entries.map_or(true, |limit| n <= limit))
            .ok_or_else(|| {
                let mut info = ErrorInfo::new(
                    "marginal-cap",
                    "marginal table exceeds the configured entry limit",
                )
                .with_context("element", index)
                .with_context("atom_count", atoms)
                .with_context("isotopes", isotope_no)
                .with_hint("raise limits.max_marginal_entries");
                if let Some(limit) = max_entries {
                    info = info.with_context("limit", limit);
                }
                IsoError::ResourceExhausted(info)
            })?;

        let isotope_masses: Vec<f64> = element.isotopes().iter().map(|iso| iso.mass).collect();
        let isotope_probs: Vec<f64> = element
            .isotopes()
            .iter()
            .map(|iso| iso.probability)
            .collect();
        let isotope_lprobs: Vec<f64> = element
            .isotopes()
            .iter()
            .map(|iso| iso.log_probability())
            .collect();
        let coefficient = ln_factorial(atoms);

        let mut raw_counts = Vec::new();
        let mut raw_lprobs = Vec::new();
        let mut raw_masses = Vec::new();
        reserve(&mut raw_counts, "marginal-counts", entries.saturating_mul(isotope_no))?;
        reserve(&mut raw_lprobs, "marginal-lprobs", entries)?;
        reserve(&mut raw_masses, "marginal-masses", entries)?;

        enumerate_partitions(atoms, isotope_no, &mut |counts: &[u32]| {
            let mut lprob = coefficient;
            let mut mass = 0.0;
            for (iso, &count) in counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let c = f64::from(count);
                lprob += c * isotope_lprobs[iso] - ln_factorial(count);
                mass += c * isotope_masses[iso];
            }
            raw_counts.extend_from_slice(counts);
            raw_lprobs.push(lprob);
            raw_masses.push(mass);
        });

        let mut order: Vec<usize> = Vec::new();
        reserve(&mut order, "marginal-order", entries)?;
        order.extend(0..raw_lprobs.len());
        order.sort_by(|&a, &b| raw_lprobs[b].total_cmp(&raw_lprobs[a]).then(a.cmp(&b)));

        let mut counts = Vec::new();
        let mut lprobs = Vec::new();
        let mut masses = Vec::new();
        reserve(&mut counts, "marginal-counts", entries.saturating_mul(isotope_no))?;
        reserve(&mut lprobs, "marginal-lprobs", entries)?;
        reserve(&mut masses, "marginal-masses", entries)?;
        for &src in &order {
            counts.extend_from_slice(&raw_counts[src * isotope_no..(src + 1) * isotope_no]);
            lprobs.push(raw_lprobs[src]);
            masses.push(raw_masses[src]);
        }

        debug!(
            "marginal table built: element={} atoms={} isotopes={} entries={}",
            index,
            atoms,
            isotope_no,
            lprobs.len()
        );

        Ok(Self {
            atom_count: atoms,
            isotope_no,
            isotope_masses,
            isotope_probs,
            counts,
            lprobs,
            masses,
        })
    }

    /// Number of sub-isotopologues.
    pub fn len(&self) -> usize {
        self.lprobs.len()
    }

    /// Always false for a table built from a validated element.
    pub fn is_empty(&self) -> bool {
        self.lprobs.is_empty()
    }

    /// Atoms of the element.
    pub fn atom_count(&self) -> u32 {
        self.atom_count
    }

    /// Width of each count vector.
    pub fn isotope_no(&self) -> usize {
        self.isotope_no
    }

    /// Log-probability of entry `idx`.
    pub fn lprob(&self, idx: usize) -> f64 {
        self.lprobs[idx]
    }

    /// Probability of entry `idx`.
    pub fn prob(&self, idx: usize) -> f64 {
        self.lprobs[idx].exp()
    }

    /// Mass of entry `idx`.
    pub fn mass(&self, idx: usize) -> f64 {
        self.masses[idx]
    }

    /// Isotope counts of entry `idx`.
    pub fn counts(&self, idx: usize) -> &[u32] {
        &self.counts[idx * self.isotope_no..(idx + 1) * self.isotope_no]
    }

    /// All log-probabilities, in decreasing order.
    pub fn lprobs(&self) -> &[f64] {
        &self.lprobs
    }

    /// All masses, aligned with [`MarginalTable::lprobs`].
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Log-probability of the most probable sub-isotopologue.
    pub fn mode_lprob(&self) -> f64 {
        self.lprobs[0]
    }

    /// Mass of the most probable sub-isotopologue.
    pub fn mode_mass(&self) -> f64 {
        self.masses[0]
    }

    /// Smallest log-probability in the table.
    pub fn smallest_lprob(&self) -> f64 {
        self.lprobs[self.lprobs.len() - 1]
    }

    /// Number of leading entries with log-probability at or above `lcutoff`.
    pub fn count_above(&self, lcutoff: f64) -> usize {
        self.lprobs.partition_point(|&lp| lp >= lcutoff)
    }

    /// Log-probabilities of the entries at or above `lcutoff`.
    pub fn prefix_above(&self, lcutoff: f64) -> &[f64] {
        &self.lprobs[..self.count_above(lcutoff)]
    }

    /// Compensated sum of all entry probabilities; 1 for a normalised element.
    pub fn total_prob(&self) -> f64 {
        self.lprobs.iter().map(|lp| lp.exp()).collect::<Summator>().get()
    }

    /// Mass with every atom as the lightest isotope.
    pub fn lightest_mass(&self) -> f64 {
        self.scaled(|masses| masses.iter().copied().fold(f64::INFINITY, f64::min))
    }

    /// Mass with every atom as the heaviest isotope.
    pub fn heaviest_mass(&self) -> f64 {
        self.scaled(|masses| masses.iter().copied().fold(0.0, f64::max))
    }

    /// Mass with every atom as the most abundant isotope.
    pub fn monoisotopic_mass(&self) -> f64 {
        let mut best = 0;
        for (iso, &p) in self.isotope_probs.iter().enumerate() {
            if p > self.isotope_probs[best] {
                best = iso;
            }
        }
        self.scaled(|masses| masses[best])
    }

    /// Expected mass of the element's contribution.
    pub fn average_mass(&self) -> f64 {
        let per_atom: Summator = self
            .isotope_masses
            .iter()
            .zip(&self.isotope_probs)
            .map(|(m, p)| m * p)
            .collect();
        f64::from(self.atom_count) * per_atom.get()
    }

    fn scaled(&self, per_atom: impl Fn(&[f64]) -> f64) -> f64 {
        if self.atom_count == 0 {
            return 0.0;
        }
        f64::from(self.atom_count) * per_atom(&self.isotope_masses)
    }
}
