//! The line-oriented wire format shared by every stage.
//!
//! A record is one text line: the key, exactly one tab, and a signed
//! integer value. Keys cannot contain tabs; a key with a tab mis-splits.

use std::fmt;
use std::io::{self, BufRead};
use std::num::IntErrorKind;

use thiserror::Error;

/// A single `(key, value)` record read from or written to a stream.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Record {
    pub key: String,
    pub value: i64,
}

impl Record {
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.key, self.value)
    }
}

/// Why a line could not be turned into a [`Record`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("line has no tab separator")]
    MissingTab,
    #[error("value `{text}` for key `{key}` is not an integer")]
    InvalidValue { key: String, text: String },
}

/// Split a raw line into its key and value text on the first tab.
///
/// Surrounding whitespace of the whole line is removed first, so a
/// trailing `\r` or a leading indent never ends up in the key.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    line.trim().split_once('\t')
}

/// Parse one line of the form `<key>\t<value>`.
///
/// Integers beyond the `i64` range are clamped to its bounds.
pub fn parse_line(line: &str) -> Result<Record, RecordError> {
    let (key, text) = split_line(line).ok_or(RecordError::MissingTab)?;
    match text.trim().parse::<i64>() {
        Ok(value) => Ok(Record::new(key, value)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(Record::new(key, i64::MAX)),
            IntErrorKind::NegOverflow => Ok(Record::new(key, i64::MIN)),
            _ => Err(RecordError::InvalidValue {
                key: key.to_string(),
                text: text.to_string(),
            }),
        },
    }
}

/// The key a line is sorted and partitioned by before reducing.
///
/// Same key the reducer parses: the trimmed text before the first tab,
/// or the whole trimmed line if it has none.
pub fn shuffle_key(line: &str) -> &str {
    split_line(line).map_or(line.trim(), |(key, _)| key)
}

/// Lazily read `\n`-terminated lines from `reader`.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// rejected, so one bad byte never ends the stream.
pub fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|line| {
        line.map(|bytes| match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_record() {
        assert_eq!(parse_line("apple\t3"), Ok(Record::new("apple", 3)));
        assert_eq!(parse_line("apple\t-3\r"), Ok(Record::new("apple", -3)));
        assert_eq!(parse_line("apple\t+7"), Ok(Record::new("apple", 7)));
    }

    #[test]
    fn splits_on_the_first_tab_only() {
        assert_eq!(split_line("a\tb\t1"), Some(("a", "b\t1")));
        assert!(matches!(
            parse_line("a\tb\t1"),
            Err(RecordError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line("apple"), Err(RecordError::MissingTab));
        assert_eq!(parse_line(""), Err(RecordError::MissingTab));
        assert_eq!(
            parse_line("apple\tmany"),
            Err(RecordError::InvalidValue {
                key: "apple".into(),
                text: "many".into()
            })
        );
        assert!(parse_line("apple\t1.5").is_err());
        assert!(parse_line("apple\t").is_err());
    }

    #[test]
    fn clamps_out_of_range_integers() {
        assert_eq!(
            parse_line("a\t9223372036854775808"),
            Ok(Record::new("a", i64::MAX))
        );
        assert_eq!(
            parse_line("a\t-99999999999999999999"),
            Ok(Record::new("a", i64::MIN))
        );
    }

    #[test]
    fn formats_with_a_single_tab() {
        assert_eq!(Record::new("pear", 12).to_string(), "pear\t12");
    }

    #[test]
    fn shuffle_key_falls_back_to_whole_line() {
        assert_eq!(shuffle_key("k\t1"), "k");
        assert_eq!(shuffle_key("no-tab"), "no-tab");
    }

    #[test]
    fn shuffle_key_matches_parsed_key() {
        assert_eq!(shuffle_key(" a\t1"), "a");
        assert_eq!(shuffle_key("  b\t2\r"), "b");
        assert_eq!(shuffle_key(" loose \r"), "loose");
        for line in [" a\t1", "a\t1", "\tx\t3 "] {
            if let Ok(record) = parse_line(line) {
                assert_eq!(shuffle_key(line), record.key);
            }
        }
    }

    #[test]
    fn read_lines_keeps_invalid_utf8_lines() {
        let input: &[u8] = b"a\t1\n\xff\xfe\t2\nb\t3";
        let lines = read_lines(input).collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "a\t1");
        assert_eq!(lines[2], "b\t3");
    }
}
