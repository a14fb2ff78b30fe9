use anyhow::Result;
use clap::Parser;
use mrwc::standalone::{engine::run_job, Args, Job};
use mrwc::utils;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    utils::init_logging("info");

    let job = Job::from(args.command);
    info!(input = %job.input, output = %job.output.display(), "submitting job");
    let summary = run_job(job).await?;
    println!("{summary}");
    Ok(())
}
