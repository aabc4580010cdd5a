use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    run::{self, RunArgs},
    summary::{self, SummaryArgs},
};
use env_logger::Env;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "isospec", about = "Isotopologue distribution calculator")]
struct Cli {
    /// Log search progress at debug level.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a query and write the accepted configurations as JSON.
    Run(RunArgs),
    /// Print composition statistics without searching.
    Summary(SummaryArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Summary(args) => summary::run(&args),
    }
}
