use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use dashmap::DashMap;
use glob::{glob, Pattern};
use itertools::Itertools;
use tracing::{info, info_span, warn};

use crate::codec::shuffle_key;
use crate::reduce::{GroupReducer, Grouped, ReduceOptions, ReduceStats};
use crate::standalone::summary::JobSummary;
use crate::standalone::{Job, FINAL_OUTPUT};
use crate::*;

// types related to this engine
type BucketIndex = u32;
type Buckets = DashMap<BucketIndex, Vec<String>>;

/// What one shard reducer produced.
#[derive(Debug, Clone)]
pub struct ShardReport {
    pub name: String,
    pub dir: PathBuf,
    pub stats: ReduceStats,
}

/// Expand the job's input glob into shard files, in a stable order.
pub fn input_shards(job: &Job) -> Result<Vec<PathBuf>> {
    let shards = glob(&job.input)?
        .flatten()
        .filter(|path| path.is_file())
        .sorted()
        .collect::<Vec<_>>();
    if shards.is_empty() {
        bail!("no input files match `{}`", job.input);
    }
    Ok(shards)
}

fn read_shard(path: &Path) -> Result<KeyValue> {
    let mut buf = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut buf))
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path.to_str().unwrap_or("unknown").to_string();
    Ok(KeyValue::new(Bytes::from(name), Bytes::from(buf)))
}

/// Map one shard and partition its lines into `num_reduce_worker` buckets
/// by the hash of their key.
pub fn perform_map(
    shard: &Path,
    engine: &Workload,
    num_reduce_worker: u32,
) -> Result<Buckets> {
    let input_kv = read_shard(shard)?;
    let buckets: Buckets = Buckets::new();
    let map_func = engine.map_fn;
    for line in map_func(input_kv)? {
        let line = line?;
        let bucket_no = ihash(shuffle_key(&line).as_bytes()) % num_reduce_worker;
        buckets.entry(bucket_no).or_insert_with(Vec::new).push(line);
    }
    Ok(buckets)
}

/// Sort a bucket so that equal keys are adjacent.
///
/// The sort is stable: lines with equal keys keep their map order.
pub fn perform_shuffle(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .sorted_by(|a, b| shuffle_key(a).cmp(shuffle_key(b)))
        .collect()
}

/// Reduce already shuffled `lines` into `out_pathspec`.
fn reduce_into(
    lines: Vec<String>,
    out_pathspec: &Path,
    options: &ReduceOptions,
) -> Result<ReduceStats> {
    let mut out_file = BufWriter::new(
        File::create(out_pathspec)
            .with_context(|| format!("creating {}", out_pathspec.display()))?,
    );
    let reducer = GroupReducer::new(options.operator).with_policy(options.flush);
    let mut groups = Grouped::new(lines.into_iter(), reducer);
    for record in groups.by_ref() {
        writeln!(out_file, "{record}")?;
    }
    out_file.flush()?;
    Ok(groups.stats().cloned().unwrap_or_default())
}

/// Run the shard reducer over every bucket, writing `part-NNNNN` files
/// into `shard_dir`.
pub fn perform_reduce(
    shard_dir: &Path,
    buckets: Buckets,
    options: &ReduceOptions,
) -> Result<ReduceStats> {
    fs::create_dir_all(shard_dir)?;
    let mut stats = ReduceStats::default();
    for (reduce_id, bkt) in buckets.into_iter() {
        let out_pathspec = shard_dir.join(format!("part-{:05}", reduce_id));
        let bucket_stats = reduce_into(perform_shuffle(bkt), &out_pathspec, options)?;
        stats.absorb(&bucket_stats);
    }
    Ok(stats)
}

/// Map and reduce a single shard.
pub fn run_shard(shard: &Path, shard_dir: &Path, job: &Job) -> Result<ShardReport> {
    let name = shard_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let _span = info_span!("shard", name = %name).entered();

    let engine = workload::named(&job.workload)?;
    let buckets = perform_map(shard, &engine, job.reducers)?;
    let stats = perform_reduce(shard_dir, buckets, &job.options)?;
    if stats.malformed > 0 {
        warn!(malformed = stats.malformed, "discarded malformed map output");
    }
    info!(groups = stats.groups, total = stats.total, "shard reduced");
    Ok(ShardReport {
        name,
        dir: shard_dir.to_path_buf(),
        stats,
    })
}

/// Merge every shard's partial output into the final result.
///
/// The partial outputs pass through the identity mapper, are re-sorted by
/// key and then folded again by the same reducer.
pub fn perform_merge(
    shards_dir: &Path,
    output: &Path,
    options: &ReduceOptions,
) -> Result<ReduceStats> {
    let _span = info_span!("merge").entered();
    let pattern = format!(
        "{}/*/part-*",
        Pattern::escape(&shards_dir.to_string_lossy())
    );
    let identity = workload::named("identity")?;

    let mut lines = Vec::new();
    let mut parts = 0usize;
    for part in glob(&pattern)?.flatten() {
        parts += 1;
        for line in (identity.map_fn)(read_shard(&part)?)? {
            lines.push(line?);
        }
    }
    info!(parts, lines = lines.len(), "merging partial outputs");

    let stats = reduce_into(perform_shuffle(lines), output, options)?;
    info!(groups = stats.groups, total = stats.total, "merge reduced");
    Ok(stats)
}

/// Remove the results of a previous run of the same job.
fn prepare_output(job: &Job) -> Result<()> {
    let final_output = job.final_output();
    if final_output.exists() {
        fs::remove_file(&final_output)?;
        info!("Removed previous {}", final_output.display());
    }
    let shards_dir = job.shards_dir();
    if shards_dir.exists() {
        fs::remove_dir_all(&shards_dir)?;
    }
    fs::create_dir_all(&shards_dir)?;
    Ok(())
}

/// Run the whole two-level job: one shard reducer per input file, in
/// parallel, then a single merge reducer.
pub async fn run_job(job: Job) -> Result<JobSummary> {
    let start_time = Instant::now();
    // fail fast on a bad workload name before touching the filesystem
    workload::named(&job.workload)?;
    prepare_output(&job)?;

    let shards = input_shards(&job)?;
    info!(shards = shards.len(), reducers = job.reducers, "running shard reducers");

    let shards_dir = job.shards_dir();
    let mut handles = Vec::with_capacity(shards.len());
    for (index, shard) in shards.iter().enumerate() {
        let file_name = shard
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let shard_dir = shards_dir.join(format!("{:05}-{}", index, file_name));
        let shard = shard.clone();
        let job = job.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            run_shard(&shard, &shard_dir, &job)
        }));
    }

    let mut malformed = 0;
    for handle in handles {
        let report = handle.await??;
        info!(shard = %report.name, dir = %report.dir.display(), "shard finished");
        malformed += report.stats.malformed;
    }

    let output = job.output.join(FINAL_OUTPUT);
    let merge_output = output.clone();
    let options = job.options;
    let merged = tokio::task::spawn_blocking(move || {
        perform_merge(&shards_dir, &merge_output, &options)
    })
    .await??;
    malformed += merged.malformed;

    let summary = JobSummary::new(
        merged.total,
        merged.groups,
        shards.len(),
        malformed,
        start_time.elapsed(),
        output,
    );
    summary.write(&job.summary)?;
    info!("Summary written to: {}", job.summary.display());
    Ok(summary)
}
