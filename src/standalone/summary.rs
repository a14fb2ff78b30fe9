//! Human- and machine-readable report of a finished job.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    /// Sum of every value in the final output. With `--op sum` this is the
    /// word count; with `max` or `min` it is the sum of per-key extremes.
    pub total_count: i64,
    /// Number of lines in the final output.
    pub distinct_keys: u64,
    pub shards: usize,
    /// Lines discarded by any reducer, either level.
    pub malformed: u64,
    pub elapsed_secs: f64,
    pub output: PathBuf,
}

impl JobSummary {
    pub fn new(
        total_count: i64,
        distinct_keys: u64,
        shards: usize,
        malformed: u64,
        elapsed: Duration,
        output: PathBuf,
    ) -> Self {
        Self {
            total_count,
            distinct_keys,
            shards,
            malformed,
            elapsed_secs: elapsed.as_secs_f64(),
            output,
        }
    }

    /// Write the text report to `path` and its JSON twin next to it.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_string())
            .with_context(|| format!("writing summary to {}", path.display()))?;
        let json_path = path.with_extension("json");
        fs::write(&json_path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing summary to {}", json_path.display()))?;
        Ok(())
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "=== MapReduce Job Summary ===")?;
        writeln!(f, "Total Word Count: {}", self.total_count)?;
        writeln!(f, "Total Processing Time: {:.2} seconds", self.elapsed_secs)?;
        writeln!(f, "Results exported to: {}", self.output.display())
    }
}
