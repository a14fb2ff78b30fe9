use std::io::{self, BufWriter};

use anyhow::Result;
use clap::Parser;
use mrwc::cmd::reduce::Args;
use mrwc::reduce::reduce_stream;
use mrwc::utils;
use tracing::debug;

fn main() -> Result<()> {
    let args = Args::parse();
    utils::init_logging("warn");

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let stats = reduce_stream(stdin, stdout, &args.options())?;
    debug!(
        lines = stats.lines,
        malformed = stats.malformed,
        groups = stats.groups,
        total = stats.total,
        "reduce finished"
    );
    Ok(())
}
