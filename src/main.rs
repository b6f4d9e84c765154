use anyhow::Result;
use clap::Parser;
use tracing::error;

use followee::{report, run_analysis, utils, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    match run_analysis(&args) {
        Ok(session) => report::print_analysis_results(&session, &args),
        Err(e) => {
            error!(action = "fail", component = "main", "Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
