use log::{debug, warn};

use super::aggregate::Aggregate;
use super::ReduceStats;
use crate::codec::{self, Record, RecordError};

/// What to do with the live group when the input ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushPolicy {
    /// Emit the live group whenever one exists.
    #[default]
    Always,
    /// Emit the live group only if the last line that carried a tab had
    /// the live group's key. A trailing line like `other\tNaN` therefore
    /// swallows the final group, as the legacy scripts did. Their other
    /// quirks (suppressing empty keys, aborting on a line without a tab)
    /// are not reproduced.
    TrailingKeyMatch,
}

/// The in-progress aggregate for one contiguous run of a key.
#[derive(Debug)]
struct Group {
    key: String,
    total: i64,
}

/// Single-pass reducer holding at most one live [`Group`].
///
/// Input must arrive with equal keys adjacent. Nothing is re-sorted: a key
/// that shows up again after another key starts a fresh group and is
/// emitted a second time.
#[derive(Debug)]
pub struct GroupReducer<A> {
    op: A,
    policy: FlushPolicy,
    group: Option<Group>,
    trailing_key_matches: bool,
    stats: ReduceStats,
}

impl<A: Aggregate> GroupReducer<A> {
    pub fn new(op: A) -> Self {
        Self {
            op,
            policy: FlushPolicy::default(),
            group: None,
            trailing_key_matches: false,
            stats: ReduceStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parse one raw line and fold it in.
    ///
    /// Lines that fail to parse are counted and dropped.
    /// Returns the group that this line closed, if any.
    pub fn push_line(&mut self, line: &str) -> Option<Record> {
        self.stats.lines += 1;
        match codec::parse_line(line) {
            Ok(record) => {
                self.stats.records += 1;
                self.trailing_key_matches = true;
                self.push(record)
            }
            Err(err) => {
                self.stats.malformed += 1;
                if let RecordError::InvalidValue { key, .. } = &err {
                    self.trailing_key_matches =
                        self.group.as_ref().is_some_and(|group| &group.key == key);
                }
                debug!("discarding line {}: {}", self.stats.lines, err);
                None
            }
        }
    }

    /// Fold an already parsed record in.
    ///
    /// Returns the previous group when `record` starts a new one.
    pub fn push(&mut self, record: Record) -> Option<Record> {
        if let Some(group) = self.group.as_mut() {
            if group.key == record.key {
                group.total = self.op.combine(group.total, record.value);
                return None;
            }
        }
        let finished = self.group.replace(Group {
            key: record.key,
            total: record.value,
        });
        finished.map(|group| self.emit(group))
    }

    /// End of input: flush the live group according to the policy.
    pub fn finish(mut self) -> (Option<Record>, ReduceStats) {
        let flush = match self.policy {
            FlushPolicy::Always => true,
            FlushPolicy::TrailingKeyMatch => self.trailing_key_matches,
        };
        let last = match self.group.take() {
            Some(group) if flush => Some(self.emit(group)),
            Some(group) => {
                warn!(
                    "dropping final group `{}` ({}) after a trailing malformed line",
                    group.key, group.total
                );
                None
            }
            None => None,
        };
        (last, self.stats)
    }

    fn emit(&mut self, group: Group) -> Record {
        self.stats.groups += 1;
        self.stats.total = self.stats.total.saturating_add(group.total);
        Record::new(group.key, group.total)
    }
}

/// Iterator adapter that lazily reduces raw lines into groups.
pub struct Grouped<I, A> {
    lines: I,
    reducer: Option<GroupReducer<A>>,
    stats: Option<ReduceStats>,
}

impl<I, A> Grouped<I, A> {
    pub fn new(lines: I, reducer: GroupReducer<A>) -> Self {
        Self {
            lines,
            reducer: Some(reducer),
            stats: None,
        }
    }

    /// Final statistics, available once the iterator is exhausted.
    pub fn stats(&self) -> Option<&ReduceStats> {
        self.stats.as_ref()
    }
}

impl<I, A> Iterator for Grouped<I, A>
where
    I: Iterator,
    I::Item: AsRef<str>,
    A: Aggregate,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let reducer = self.reducer.as_mut()?;
        for line in self.lines.by_ref() {
            if let Some(record) = reducer.push_line(line.as_ref()) {
                return Some(record);
            }
        }
        let (last, stats) = self.reducer.take()?.finish();
        self.stats = Some(stats);
        last
    }
}

/// Reduce `lines` with `op` and the default flush policy.
pub fn group_lines<I, A>(lines: I, op: A) -> Grouped<I::IntoIter, A>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    A: Aggregate,
{
    Grouped::new(lines.into_iter(), GroupReducer::new(op))
}
