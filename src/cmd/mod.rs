//! Command-line arguments for the stream binaries.

pub mod map;
pub mod reduce;
