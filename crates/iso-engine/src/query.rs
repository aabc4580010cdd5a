use iso_core::{CancelToken, Composition, IsoError, Summator};
use iso_marginal::MarginalSet;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::candidate::SearchOutcome;
use crate::distribution::{materialize, IsoDistribution};
use crate::guard::SearchGuard;
use crate::layered::{EngineSizing, LayeredEngine};
use crate::ordered::run_ordered;
use crate::params::{Query, QueryOpts, Strategy};
use crate::policy::{QuantilePolicy, SplinePolicy};
use crate::threshold::{run_threshold, ThresholdGenerator};
use crate::trim::trim_to_target;

/// Bookkeeping reported alongside a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Strategy that produced the rows.
    pub strategy: Strategy,
    /// Rows in the returned distribution.
    pub rows: usize,
    /// Compensated probability of the returned rows.
    pub covered_prob: f64,
    /// Frontier rounds; zero for the non-layered strategies.
    pub rounds: usize,
    /// Distinct index vectors discovered by the frontier searches.
    pub visited_states: usize,
    /// The whole space was consumed before the target was met.
    pub exhausted: bool,
    /// Rows dropped by trimming.
    pub trimmed: usize,
}

/// Distribution plus search statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// Accepted configurations.
    pub distribution: IsoDistribution,
    /// How they were found.
    pub stats: SearchStats,
}

/// Runs a query to completion with no external cancellation.
pub fn run_query(query: &Query) -> Result<IsoDistribution, IsoError> {
    execute(query, &CancelToken::new()).map(|outcome| outcome.distribution)
}

/// Runs a query, checking `cancel` at every queue pop and frontier round.
///
/// Either the full answer for the stop condition is returned or an error;
/// no partial rows survive a failure.
pub fn execute(query: &Query, cancel: &CancelToken) -> Result<QueryOutcome, IsoError> {
    let opts = query.opts.sanitised();
    let strategy = query.strategy;
    let stop = query.stop_condition;
    strategy.validate_stop(stop)?;

    let mut guard = SearchGuard::new(cancel.clone(), &opts);
    let composition = Composition::new(&query.elements)?;
    let set = MarginalSet::build(&composition, &opts.marginal_opts())?;
    guard.checkpoint_round()?;

    let mut outcome = search(&set, strategy, stop, &opts, &mut guard)?;

    let apply_trim =
        opts.trim && matches!(strategy, Strategy::Layered | Strategy::LayeredEstimating);
    let (trimmed, covered_prob) = if apply_trim {
        let removed = trim_to_target(&mut outcome.accepted, stop);
        let kept: Summator = outcome.accepted.iter().map(|c| c.prob()).collect();
        (removed, kept.get())
    } else {
        (0, outcome.covered)
    };

    let distribution = materialize(&set, &outcome.accepted)?;
    if outcome.exhausted && stop < 1.0 {
        warn!(
            "configuration space exhausted at {:.12} before reaching {} (isotope probabilities may not sum to 1)",
            covered_prob, stop
        );
    }
    let stats = SearchStats {
        strategy,
        rows: distribution.len(),
        covered_prob,
        rounds: outcome.rounds,
        visited_states: outcome.visited,
        exhausted: outcome.exhausted,
        trimmed,
    };
    info!(
        "query done: strategy={} rows={} covered={:.12} trimmed={}",
        strategy, stats.rows, stats.covered_prob, trimmed
    );
    Ok(QueryOutcome {
        distribution,
        stats,
    })
}

fn search(
    set: &MarginalSet,
    strategy: Strategy,
    stop: f64,
    opts: &QueryOpts,
    guard: &mut SearchGuard,
) -> Result<SearchOutcome, IsoError> {
    debug!("dispatching {strategy} with stop={stop}");
    let sizing = EngineSizing {
        table_size_hint: opts.table_size_hint,
        hash_size_hint: opts.hash_size_hint,
        max_states: opts.limits.max_states,
    };
    match strategy {
        Strategy::Ordered => run_ordered(
            set,
            stop,
            opts.hash_size_hint,
            opts.table_size_hint,
            opts.limits.max_states,
            guard,
        ),
        Strategy::ThresholdAbsolute => run_threshold(
            set,
            ThresholdGenerator::absolute(set, stop),
            opts.table_size_hint,
            guard,
        ),
        Strategy::ThresholdRelative => run_threshold(
            set,
            ThresholdGenerator::relative(set, stop),
            opts.table_size_hint,
            guard,
        ),
        Strategy::Layered => {
            LayeredEngine::new(set, QuantilePolicy::new(opts.layered_step), stop, sizing)
                .run(guard)
        }
        Strategy::LayeredEstimating => {
            LayeredEngine::new(set, SplinePolicy::new(opts.layered_step), stop, sizing).run(guard)
        }
    }
}
