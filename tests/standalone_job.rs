//! End-to-end runs of the local two-level job.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use mrwc::reduce::ReduceOptions;
use mrwc::standalone::engine::run_job;
use mrwc::standalone::Job;
use tempfile::TempDir;

fn job(dir: &Path, reducers: u32) -> Job {
    Job {
        input: format!("{}/input/*.txt", dir.display()),
        output: dir.join("out"),
        workload: "wc".into(),
        reducers,
        options: ReduceOptions::default(),
        summary: dir.join("out").join("mapreduce_summary.txt"),
    }
}

fn write_inputs(dir: &Path) {
    fs::create_dir_all(dir.join("input")).unwrap();
    fs::write(dir.join("input/a.txt"), "The quick brown fox.\nThe lazy dog!").unwrap();
    fs::write(dir.join("input/b.txt"), "the dog, the fox; THE END").unwrap();
    fs::write(dir.join("input/c.txt"), "").unwrap();
}

fn read_totals(path: &Path) -> BTreeMap<String, i64> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            let (key, value) = line.split_once('\t').unwrap();
            (key.to_string(), value.parse().unwrap())
        })
        .collect()
}

#[tokio::test]
async fn counts_words_across_shards() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());

    let summary = run_job(job(dir.path(), 3)).await.unwrap();

    let totals = read_totals(&dir.path().join("out/part-00000"));
    assert_eq!(totals["the"], 5);
    assert_eq!(totals["fox"], 2);
    assert_eq!(totals["dog"], 2);
    assert_eq!(totals["end"], 1);
    assert_eq!(totals.len(), 7);

    assert_eq!(summary.total_count, 13);
    assert_eq!(summary.distinct_keys, 7);
    assert_eq!(summary.shards, 3);
    assert_eq!(summary.malformed, 0);

    let text = fs::read_to_string(dir.path().join("out/mapreduce_summary.txt")).unwrap();
    assert!(text.contains("=== MapReduce Job Summary ==="));
    assert!(text.contains("Total Word Count: 13"));
    assert!(dir.path().join("out/mapreduce_summary.json").exists());
}

#[tokio::test]
async fn final_output_is_sorted_and_one_line_per_word() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    run_job(job(dir.path(), 2)).await.unwrap();

    let out = fs::read_to_string(dir.path().join("out/part-00000")).unwrap();
    let keys = out
        .lines()
        .map(|l| l.split('\t').next().unwrap())
        .collect::<Vec<_>>();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn reducer_count_does_not_change_totals() {
    let one = TempDir::new().unwrap();
    let many = TempDir::new().unwrap();
    write_inputs(one.path());
    write_inputs(many.path());

    run_job(job(one.path(), 1)).await.unwrap();
    run_job(job(many.path(), 5)).await.unwrap();

    assert_eq!(
        read_totals(&one.path().join("out/part-00000")),
        read_totals(&many.path().join("out/part-00000"))
    );
}

#[tokio::test]
async fn rerun_replaces_previous_results() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    run_job(job(dir.path(), 2)).await.unwrap();

    fs::write(dir.path().join("input/b.txt"), "zebra").unwrap();
    let summary = run_job(job(dir.path(), 2)).await.unwrap();

    let totals = read_totals(&dir.path().join("out/part-00000"));
    assert_eq!(totals.get("zebra"), Some(&1));
    assert_eq!(totals.get("end"), None);
    assert_eq!(summary.total_count, 8);
}

#[tokio::test]
async fn unknown_workload_fails() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    let mut job = job(dir.path(), 1);
    job.workload = "nope".into();
    assert!(run_job(job).await.is_err());
}
