//! A MapReduce-compatible implementation of word count.
//!

use crate::codec::Record;
use crate::utils::string_from_bytes;
use crate::*;

/// Emit `word\t1` for every word of the document.
///
/// A word is a maximal run of alphabetic characters, lowercased.
pub fn map(kv: KeyValue) -> MapOutput {
    let s = string_from_bytes(kv.into_value())?;
    let words = s
        .split(|c: char| !c.is_alphabetic())
        .filter(|s| !s.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>();

    let iter = words
        .into_iter()
        .map(|word| anyhow::Ok(Record::new(word, 1).to_string()));
    Ok(Box::new(iter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn emits_one_line_per_word() {
        let kv = KeyValue::new(
            Bytes::from("doc.txt"),
            Bytes::from("The cat, the HAT!\nit's 42 cats"),
        );
        let lines = map(kv).unwrap().collect::<anyhow::Result<Vec<_>>>().unwrap();
        assert_eq!(
            lines,
            vec!["the\t1", "cat\t1", "the\t1", "hat\t1", "it\t1", "s\t1", "cats\t1"]
        );
    }

    #[test]
    fn rejects_binary_input() {
        let kv = KeyValue::new(Bytes::from("bin"), Bytes::from_static(&[0xff, 0xfe]));
        assert!(map(kv).is_err());
    }
}
