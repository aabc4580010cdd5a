use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use iso_engine::{
    canonical_distribution_hash, execute, hash_query, CancelToken, IsoDistribution, SearchStats,
    Strategy,
};
use log::info;
use serde::Serialize;

use super::{emit, load_query};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Query document (YAML or JSON).
    #[arg(long)]
    pub query: PathBuf,
    /// Override the document's strategy.
    #[arg(long)]
    pub strategy: Option<Strategy>,
    /// Override the document's stop condition.
    #[arg(long)]
    pub stop: Option<f64>,
    /// Disable trimming of layered results.
    #[arg(long)]
    pub no_trim: bool,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    query_hash: String,
    distribution_hash: String,
    stats: &'a SearchStats,
    masses: &'a [f64],
    lprobs: &'a [f64],
    counts: Vec<Vec<u32>>,
    isotope_numbers: &'a [usize],
}

impl<'a> RunReport<'a> {
    fn new(query_hash: String, dist: &'a IsoDistribution, stats: &'a SearchStats) -> Self {
        Self {
            query_hash,
            distribution_hash: canonical_distribution_hash(dist),
            stats,
            masses: dist.masses(),
            lprobs: dist.lprobs(),
            counts: dist.count_rows(),
            isotope_numbers: dist.isotope_numbers(),
        }
    }
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut query = load_query(&args.query)?;
    if let Some(strategy) = args.strategy {
        query.strategy = strategy;
    }
    if let Some(stop) = args.stop {
        query.stop_condition = stop;
    }
    if args.no_trim {
        query.opts.trim = false;
    }

    let query_hash = hash_query(&query)?;
    let outcome = execute(&query, &CancelToken::new())?;
    info!(
        "{} rows, covered {:.12}",
        outcome.stats.rows, outcome.stats.covered_prob
    );
    let report = RunReport::new(query_hash, &outcome.distribution, &outcome.stats);
    emit(&report, args.out.as_deref())
}
