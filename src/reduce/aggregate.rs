//! Fold operators a [`GroupReducer`](super::GroupReducer) can run.
//!
//! # Contract
//!
//! Reduction runs hierarchically: shard reducers fold disjoint slices of
//! the input, and the merge reducer folds their partial results again in
//! whatever order the shuffle delivers them. That only yields the same
//! answer as a single global fold if `combine` is **associative** and
//! **commutative**. Sum, max and min qualify; something like "last value
//! wins" or a mean over partial means does not, and must not be added here.
//!
//! # Example
//!
//! ```
//! use mrwc::reduce::aggregate::{self, Aggregate};
//! let sum = aggregate::named("sum")?;
//! assert_eq!(sum.combine(2, 3), 5);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, Result};

/// An associative, commutative fold over integer values.
pub trait Aggregate {
    /// Short name used on the command line and in logs.
    fn name(&self) -> &'static str;

    /// Fold `value` into the running total `acc`.
    fn combine(&self, acc: i64, value: i64) -> i64;
}

/// Integer addition, saturating at the bounds of `i64`.
///
/// Associative only while no partial total reaches a bound; word counts
/// stay far below that.
#[derive(Copy, Clone, Debug, Default)]
pub struct Sum;

impl Aggregate for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    #[inline]
    fn combine(&self, acc: i64, value: i64) -> i64 {
        acc.saturating_add(value)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Max;

impl Aggregate for Max {
    fn name(&self) -> &'static str {
        "max"
    }

    #[inline]
    fn combine(&self, acc: i64, value: i64) -> i64 {
        acc.max(value)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Min;

impl Aggregate for Min {
    fn name(&self) -> &'static str {
        "min"
    }

    #[inline]
    fn combine(&self, acc: i64, value: i64) -> i64 {
        acc.min(value)
    }
}

/// A runtime-selected operator, for callers that pick one by name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    Sum,
    Max,
    Min,
}

impl Aggregate for Operator {
    fn name(&self) -> &'static str {
        match self {
            Operator::Sum => Sum.name(),
            Operator::Max => Max.name(),
            Operator::Min => Min.name(),
        }
    }

    #[inline]
    fn combine(&self, acc: i64, value: i64) -> i64 {
        match self {
            Operator::Sum => Sum.combine(acc, value),
            Operator::Max => Max.combine(acc, value),
            Operator::Min => Min.combine(acc, value),
        }
    }
}

/// Gets the [`Operator`] named `name`.
///
/// Returns [`None`] if no operator with the given name was found.
pub fn try_named(name: &str) -> Option<Operator> {
    match name {
        "sum" => Some(Operator::Sum),
        "max" => Some(Operator::Max),
        "min" => Some(Operator::Min),
        _ => None,
    }
}

/// Gets the [`Operator`] named `name`.
///
/// Returns an [`anyhow::Error`] if no operator with the given name was found.
pub fn named(name: &str) -> Result<Operator> {
    match try_named(name) {
        Some(op) => Ok(op),
        None => bail!("No operator named `{}` found.", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(try_named("sum"), Some(Operator::Sum));
        assert_eq!(try_named("max"), Some(Operator::Max));
        assert_eq!(try_named("min"), Some(Operator::Min));
        assert!(try_named("avg").is_none());
        assert!(named("avg").is_err());
    }

    #[test]
    fn sum_saturates() {
        assert_eq!(Sum.combine(i64::MAX, 1), i64::MAX);
        assert_eq!(Sum.combine(i64::MIN, -1), i64::MIN);
    }

    #[test]
    fn operators_are_associative_and_commutative_on_samples() {
        let samples = [-7, 0, 1, 3, 42];
        for op in [Operator::Sum, Operator::Max, Operator::Min] {
            for &a in &samples {
                for &b in &samples {
                    assert_eq!(op.combine(a, b), op.combine(b, a), "{}", op.name());
                    for &c in &samples {
                        assert_eq!(
                            op.combine(op.combine(a, b), c),
                            op.combine(a, op.combine(b, c)),
                            "{}",
                            op.name()
                        );
                    }
                }
            }
        }
    }
}
