//! A streaming, two-level MapReduce word count.
//!
//! Shard reducers fold a sorted stream of `key\tcount` lines into one
//! partial total per key. A merge reducer, which is the very same
//! [`reduce::GroupReducer`], folds the concatenated shard outputs into the
//! final totals. Data between stages is plain tab-separated text, as in a
//! streaming framework.

use bytes::Bytes;
use std::hash::Hasher;

pub mod codec;
pub mod cmd;
pub mod reduce;
pub mod standalone;
pub mod utils;
pub mod workload;

pub use codec::{Record, RecordError};
pub use reduce::{Aggregate, FlushPolicy, GroupReducer, ReduceError, ReduceOptions, ReduceStats};

/////////////////////////////////////////////////////////////////////////////
// Map stage types
/////////////////////////////////////////////////////////////////////////////

/// The output of a map function: an iterator over raw output lines.
///
/// There are 2 layers of [`anyhow::Result`]s here. The outer layer
/// accounts for errors that arise while creating the iterator.
/// The inner layer accounts for errors that occur during iteration.
pub type MapOutput = anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<String>>>>;

/// A map function takes a (source name, contents) pair and
/// returns an iterator that yields `key\tvalue` lines.
pub type MapFn = fn(kv: KeyValue) -> MapOutput;

/// A map stage application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair handed to a map function.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key, usually the name of the input shard.
    pub key: Bytes,
    /// The value, usually the whole contents of the shard.
    pub value: Bytes,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> Bytes {
        self.value
    }
}

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    // masked to 31 bits, so the narrowing cannot lose information
    (hasher.finish() & 0x7fffffff) as u32
}
