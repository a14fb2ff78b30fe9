//! Utility functions shared by the binaries and the map stage.
//!

use anyhow::Result;
use bytes::Bytes;
use tracing_subscriber::EnvFilter;

/// Read an entire [`Bytes`] slice into a [`String`].
///
/// Returns an error if the slice contains invalid UTF-8.
pub fn string_from_bytes(buf: Bytes) -> Result<String> {
    Ok(String::from_utf8(buf.as_ref().into())?)
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `default_filter`.
/// Output always goes to stderr: stdout is reserved for records.
/// `log` records from the library are bridged into the same subscriber.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // a second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8() {
        assert_eq!(string_from_bytes(Bytes::from("héllo")).unwrap(), "héllo");
        assert!(string_from_bytes(Bytes::from_static(&[0xc3])).is_err());
    }
}
