use std::io::{self, BufWriter, Read, Write};

use anyhow::Result;
use bytes::Bytes;
use clap::Parser;
use mrwc::cmd::map::Args;
use mrwc::*;

fn main() -> Result<()> {
    let args = Args::parse();
    utils::init_logging("warn");
    let engine = workload::named(&args.workload)?;

    let mut buf = Vec::new();
    io::stdin().lock().read_to_end(&mut buf)?;
    let input_kv = KeyValue::new(Bytes::from_static(b"stdin"), Bytes::from(buf));

    let mut out = BufWriter::new(io::stdout().lock());
    for line in (engine.map_fn)(input_kv)? {
        writeln!(out, "{}", line?)?;
    }
    out.flush()?;
    Ok(())
}
