use clap::Parser;

/// Map text from stdin into `key\tvalue` lines on stdout.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Name of the map workload (wc or identity)
    #[clap(short, long, default_value = "wc")]
    pub workload: String,
}
