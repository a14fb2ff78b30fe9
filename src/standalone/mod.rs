use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::reduce::{aggregate, FlushPolicy, ReduceOptions};

pub mod engine;
pub mod summary;

/// File name of the merged result inside the output directory.
pub const FINAL_OUTPUT: &str = "part-00000";
/// Directory under the output directory holding the shard reducer outputs.
pub const SHARDS_DIR: &str = "shards";
/// Default summary file name inside the output directory.
pub const SUMMARY_FILE: &str = "mapreduce_summary.txt";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a two-level job over local files
    Submit {
        /// Glob spec for the input files; every file is one shard
        #[arg(short, long)]
        input: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Name of the map workload
        #[arg(short, long, default_value = "wc")]
        workload: String,

        /// Reducers per shard
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        reducers: u32,

        /// Fold operator: sum, max or min
        #[arg(long, default_value = "sum", value_parser = aggregate::named)]
        op: aggregate::Operator,

        /// Reproduce the legacy final-flush behaviour
        #[arg(long)]
        legacy_flush: bool,

        /// Where to write the job summary [default: <output>/mapreduce_summary.txt]
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: String,
    pub output: PathBuf,
    pub workload: String,
    pub reducers: u32,
    pub options: ReduceOptions,
    pub summary: PathBuf,
}

impl From<Commands> for Job {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Submit {
                input,
                output,
                workload,
                reducers,
                op,
                legacy_flush,
                summary,
            } => {
                let summary = summary.unwrap_or_else(|| output.join(SUMMARY_FILE));
                let flush = if legacy_flush {
                    FlushPolicy::TrailingKeyMatch
                } else {
                    FlushPolicy::Always
                };
                Job {
                    input,
                    output,
                    workload,
                    reducers,
                    options: ReduceOptions {
                        operator: op,
                        flush,
                    },
                    summary,
                }
            }
        }
    }
}

impl Job {
    /// Path of the merged result.
    pub fn final_output(&self) -> PathBuf {
        self.output.join(FINAL_OUTPUT)
    }

    /// Directory the shard reducers write into.
    pub fn shards_dir(&self) -> PathBuf {
        self.output.join(SHARDS_DIR)
    }
}
