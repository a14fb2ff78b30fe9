use clap::Parser;

use crate::reduce::{aggregate, FlushPolicy, ReduceOptions};

/// Reduce sorted `key\tvalue` lines from stdin into one total per key on stdout.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Fold operator: sum, max or min
    #[clap(long, default_value = "sum", value_parser = aggregate::named)]
    pub op: aggregate::Operator,
    /// Skip the final group when the last line with a tab belongs to another key
    #[clap(long)]
    pub legacy_flush: bool,
}

impl Args {
    pub fn options(&self) -> ReduceOptions {
        ReduceOptions {
            operator: self.op,
            flush: if self.legacy_flush {
                FlushPolicy::TrailingKeyMatch
            } else {
                FlushPolicy::Always
            },
        }
    }
}
