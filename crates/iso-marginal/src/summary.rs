use serde::{Deserialize, Serialize};

use crate::set::MarginalSet;

/// Whole-molecule statistics that need no search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSummary {
    /// Mass with every atom as its element's lightest isotope.
    pub lightest_mass: f64,
    /// Mass with every atom as its element's heaviest isotope.
    pub heaviest_mass: f64,
    /// Mass with every atom as its element's most abundant isotope.
    pub monoisotopic_mass: f64,
    /// Mass of the most probable configuration.
    pub mode_mass: f64,
    /// Log-probability of the most probable configuration.
    pub mode_lprob: f64,
    /// Expected molecular mass.
    pub average_mass: f64,
    /// Number of configurations, when it fits in 64 bits.
    pub space_size: Option<u64>,
    /// Natural log of the number of configurations.
    pub ln_space_size: f64,
}

/// Computes the summary for an already built marginal set.
pub fn summarize(set: &MarginalSet) -> CompositionSummary {
    let tables = set.tables();
    CompositionSummary {
        lightest_mass: tables.iter().map(|t| t.lightest_mass()).sum(),
        heaviest_mass: tables.iter().map(|t| t.heaviest_mass()).sum(),
        monoisotopic_mass: tables.iter().map(|t| t.monoisotopic_mass()).sum(),
        mode_mass: tables.iter().map(|t| t.mode_mass()).sum(),
        mode_lprob: set.mode_lprob(),
        average_mass: tables.iter().map(|t| t.average_mass()).sum(),
        space_size: set.space_size().and_then(|n| u64::try_from(n).ok()),
        ln_space_size: set.ln_space_size(),
    }
}
