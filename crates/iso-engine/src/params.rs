use std::fmt;
use std::str::FromStr;

use iso_core::{ElementSpec, ErrorInfo, IsoError};
use iso_marginal::MarginalOpts;
use serde::{Deserialize, Serialize};

/// Enumeration strategy selecting how the product space is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Strategy {
    /// Best-first merge; rows come out in non-increasing probability.
    Ordered,
    /// Frontier rounds with a fringe-quantile threshold.
    Layered,
    /// Frontier rounds with an extrapolated threshold.
    LayeredEstimating,
    /// Every configuration at or above an absolute probability floor.
    ThresholdAbsolute,
    /// Every configuration at or above a fraction of the mode probability.
    ThresholdRelative,
}

impl Strategy {
    /// All strategies in a stable order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Ordered,
        Strategy::Layered,
        Strategy::LayeredEstimating,
        Strategy::ThresholdAbsolute,
        Strategy::ThresholdRelative,
    ];

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Ordered => "ordered",
            Strategy::Layered => "layered",
            Strategy::LayeredEstimating => "layered_estimating",
            Strategy::ThresholdAbsolute => "threshold_absolute",
            Strategy::ThresholdRelative => "threshold_relative",
        }
    }

    /// True for the two floor-based strategies.
    pub fn is_threshold(&self) -> bool {
        matches!(
            self,
            Strategy::ThresholdAbsolute | Strategy::ThresholdRelative
        )
    }

    /// Checks that `stop` is meaningful for this strategy.
    ///
    /// Coverage targets, absolute floors and relative fractions are all
    /// probabilities, so the accepted range is `[0, 1]` in every case.
    pub fn validate_stop(&self, stop: f64) -> Result<(), IsoError> {
        if stop.is_nan() || !(0.0..=1.0).contains(&stop) {
            let meaning = if self.is_threshold() {
                "probability floor"
            } else {
                "coverage target"
            };
            return Err(IsoError::InvalidStopCondition(
                ErrorInfo::new(
                    "stop-out-of-range",
                    format!("{meaning} must lie in [0, 1]"),
                )
                .with_context("strategy", self.name())
                .with_context("stop_condition", stop),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = IsoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == name)
            .ok_or_else(|| {
                IsoError::InvalidStrategy(
                    ErrorInfo::new("unknown-strategy", "unrecognised strategy name")
                        .with_context("name", name)
                        .with_hint(
                            "expected one of ordered, layered, layered_estimating, \
                             threshold_absolute, threshold_relative",
                        ),
                )
            })
    }
}

impl TryFrom<String> for Strategy {
    type Error = IsoError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Hard caps protecting the process from pathological inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum entries in any single marginal table.
    #[serde(default = "default_max_marginal_entries")]
    pub max_marginal_entries: Option<usize>,
    /// Maximum distinct index vectors tracked by the frontier searches.
    #[serde(default = "default_max_states")]
    pub max_states: Option<usize>,
    /// Maximum rows in a result.
    #[serde(default)]
    pub max_configurations: Option<usize>,
}

fn default_max_marginal_entries() -> Option<usize> {
    Some(10_000_000)
}

fn default_max_states() -> Option<usize> {
    Some(50_000_000)
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_marginal_entries: default_max_marginal_entries(),
            max_states: default_max_states(),
            max_configurations: None,
        }
    }
}

/// Query options. Only `trim` changes the answer; the rest tune resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOpts {
    /// Shrink layered results to the smallest set meeting the target.
    #[serde(default = "default_trim")]
    pub trim: bool,
    /// Initial capacity of row and fringe buffers.
    #[serde(default = "default_size_hint")]
    pub table_size_hint: usize,
    /// Initial capacity of the visited-state index.
    #[serde(default = "default_size_hint")]
    pub hash_size_hint: usize,
    /// Fringe quantile used by the layered threshold rule.
    #[serde(default = "default_layered_step")]
    pub layered_step: f64,
    /// Build element tables concurrently.
    #[serde(default = "default_parallel")]
    pub parallel_marginals: bool,
    /// Wall-clock budget for the search in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Resource caps.
    #[serde(default)]
    pub limits: Limits,
}

fn default_trim() -> bool {
    true
}

fn default_size_hint() -> usize {
    1000
}

fn default_layered_step() -> f64 {
    0.3
}

fn default_parallel() -> bool {
    true
}

impl Default for QueryOpts {
    fn default() -> Self {
        Self {
            trim: default_trim(),
            table_size_hint: default_size_hint(),
            hash_size_hint: default_size_hint(),
            layered_step: default_layered_step(),
            parallel_marginals: default_parallel(),
            timeout_ms: None,
            limits: Limits::default(),
        }
    }
}

impl QueryOpts {
    /// Returns a copy with tuning knobs clamped into usable ranges.
    pub fn sanitised(&self) -> Self {
        let layered_step = if self.layered_step.is_finite() {
            self.layered_step.clamp(0.01, 0.99)
        } else {
            default_layered_step()
        };
        Self {
            trim: self.trim,
            table_size_hint: self.table_size_hint.max(1),
            hash_size_hint: self.hash_size_hint.max(1),
            layered_step,
            parallel_marginals: self.parallel_marginals,
            timeout_ms: self.timeout_ms,
            limits: self.limits,
        }
    }

    /// Marginal construction options derived from these query options.
    pub fn marginal_opts(&self) -> MarginalOpts {
        MarginalOpts {
            max_entries: self.limits.max_marginal_entries,
            parallel: self.parallel_marginals,
        }
    }
}

/// A complete isotopologue query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Elements in molecule order.
    pub elements: Vec<ElementSpec>,
    /// Search strategy.
    pub strategy: Strategy,
    /// Coverage target or probability floor, depending on `strategy`.
    pub stop_condition: f64,
    /// Options.
    #[serde(default)]
    pub opts: QueryOpts,
}

impl Query {
    /// Creates a query with default options.
    pub fn new(elements: Vec<ElementSpec>, strategy: Strategy, stop_condition: f64) -> Self {
        Self {
            elements,
            strategy,
            stop_condition,
            opts: QueryOpts::default(),
        }
    }

    /// Replaces the options.
    pub fn with_opts(mut self, opts: QueryOpts) -> Self {
        self.opts = opts;
        self
    }
}
