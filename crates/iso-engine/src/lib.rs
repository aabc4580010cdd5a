#![deny(missing_docs)]
//! Isotopologue enumeration strategies over per-element marginal tables.
//!
//! A [`Query`] names a composition, a [`Strategy`] and a stop condition.
//! [`execute`] builds the marginal tables, runs the selected search, trims
//! when asked and materialises the accepted configurations into an
//! [`IsoDistribution`].

mod candidate;
mod distribution;
mod guard;
mod hash;
mod layered;
mod ordered;
mod params;
mod policy;
mod query;
mod serde;
mod threshold;
mod trim;

pub use candidate::Candidate;
pub use distribution::{IsoDistribution, Isotopologue};
pub use guard::SearchGuard;
pub use hash::{canonical_distribution_hash, hash_query, stable_hash_string};
pub use layered::{EngineSizing, LayeredEngine, Phase};
pub use ordered::OrderedGenerator;
pub use params::{Limits, Query, QueryOpts, Strategy};
pub use policy::{QuantilePolicy, SplinePolicy, ThresholdPolicy};
pub use query::{execute, run_query, QueryOutcome, SearchStats};
pub use self::serde::{
    from_bytes, from_json, from_json_slice, query_from_json, query_to_json, to_bytes,
    to_canonical_json_bytes, to_json,
};
pub use threshold::ThresholdGenerator;
pub use trim::trim_to_target;

pub use iso_core::{CancelToken, ElementSpec, ErrorInfo, IsoError};
pub use iso_marginal::{summarize, CompositionSummary, MarginalOpts, MarginalSet};
