//! The group-aggregation reducer.
//!
//! Both levels of the job run this same code: a shard reducer folds
//! `(word, 1)` lines into per-shard partial counts, and the merge reducer
//! folds the re-sorted partial counts into the final totals.
//!
//! ```
//! use mrwc::reduce::{reduce_stream, ReduceOptions};
//!
//! let input = "a\t1\na\t2\nb\t5\n";
//! let mut output = Vec::new();
//! reduce_stream(input.as_bytes(), &mut output, &ReduceOptions::default())?;
//! assert_eq!(output, b"a\t3\nb\t5\n");
//! # Ok::<(), mrwc::ReduceError>(())
//! ```

use std::io::{self, BufRead, Write};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec;

pub mod aggregate;
pub mod group;

pub use aggregate::{Aggregate, Operator};
pub use group::{group_lines, FlushPolicy, GroupReducer, Grouped};

/// Knobs shared by the reducer binary and the standalone runner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceOptions {
    pub operator: Operator,
    pub flush: FlushPolicy,
}

/// Counters collected over one reducer run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceStats {
    /// Raw lines read.
    pub lines: u64,
    /// Lines that parsed into a record.
    pub records: u64,
    /// Lines discarded as malformed.
    pub malformed: u64,
    /// Groups emitted.
    pub groups: u64,
    /// Saturating sum of all emitted values, whatever the operator.
    pub total: i64,
}

impl ReduceStats {
    /// Fold the counters of another run into these.
    pub fn absorb(&mut self, other: &ReduceStats) {
        self.lines += other.lines;
        self.records += other.records;
        self.malformed += other.malformed;
        self.groups += other.groups;
        self.total = self.total.saturating_add(other.total);
    }
}

/// The only failure a reducer run can have: its input or output broke.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("reducer I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Read lines from `reader`, reduce them and write one `key\ttotal` line
/// per group to `writer`.
///
/// `writer` is flushed before returning. An empty input writes nothing.
pub fn reduce_stream<R, W>(
    reader: R,
    mut writer: W,
    options: &ReduceOptions,
) -> Result<ReduceStats, ReduceError>
where
    R: BufRead,
    W: Write,
{
    let mut reducer = GroupReducer::new(options.operator).with_policy(options.flush);
    for line in codec::read_lines(reader) {
        if let Some(record) = reducer.push_line(&line?) {
            writeln!(writer, "{record}")?;
        }
    }
    let (last, stats) = reducer.finish();
    if let Some(record) = last {
        writeln!(writer, "{record}")?;
    }
    writer.flush()?;

    debug!(
        "{} reduce: {} lines, {} malformed, {} groups",
        options.operator.name(),
        stats.lines,
        stats.malformed,
        stats.groups
    );
    Ok(stats)
}
