//! The pass-through mapper: every input line is forwarded untouched.
//!
//! This is what sits in front of the merge reducer, whose input is the
//! already formatted output of the shard reducers.

use crate::utils::string_from_bytes;
use crate::*;

pub fn map(kv: KeyValue) -> MapOutput {
    let s = string_from_bytes(kv.into_value())?;
    let lines = s.lines().map(str::to_string).collect::<Vec<_>>();
    Ok(Box::new(lines.into_iter().map(anyhow::Ok)))
}
