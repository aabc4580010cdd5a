use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use iso_core::Composition;
use iso_engine::{hash_query, summarize, CompositionSummary, MarginalSet};
use serde::Serialize;

use super::{emit, load_query};

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Query document (YAML or JSON); only its elements and limits are used.
    #[arg(long)]
    pub query: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    query_hash: String,
    isotope_numbers: Vec<usize>,
    marginal_sizes: Vec<usize>,
    summary: CompositionSummary,
}

pub fn run(args: &SummaryArgs) -> Result<(), Box<dyn Error>> {
    let query = load_query(&args.query)?;
    let composition = Composition::new(&query.elements)?;
    let set = MarginalSet::build(&composition, &query.opts.sanitised().marginal_opts())?;
    let report = SummaryReport {
        query_hash: hash_query(&query)?,
        isotope_numbers: set.isotope_numbers(),
        marginal_sizes: set.tables().iter().map(|table| table.len()).collect(),
        summary: summarize(&set),
    };
    emit(&report, args.out.as_deref())
}
