#![deny(missing_docs)]
#![doc = "Per-element marginal isotope tables and their product-space view."]

/// Product view over all element tables.
pub mod set;
/// Composition level statistics.
pub mod summary;
/// Single element table construction.
pub mod table;

pub use set::{MarginalOpts, MarginalSet};
pub use summary::{summarize, CompositionSummary};
pub use table::{ln_partition_count, partition_count, MarginalTable};
