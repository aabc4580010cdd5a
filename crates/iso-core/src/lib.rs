#![deny(missing_docs)]
#![doc = "Core data model, error surface and numeric primitives shared by the isotopologue crates."]

/// Cooperative cancellation.
pub mod cancel;
/// Visited-state index used by the frontier searches.
pub mod dedup;
pub mod errors;
pub mod summator;
mod types;

pub use cancel::CancelToken;
pub use dedup::{DedupIndex, FixedSipState};
pub use errors::{ErrorInfo, IsoError};
pub use summator::{covers, Summator, COVERAGE_SLACK};
pub use types::{Composition, Element, ElementSpec, Isotope};
