//! Exact streaming variance over integer samples.
//!
//! # Algorithm
//!
//! The accumulator keeps the exact count, sum and sum of squares of the
//! samples in multi-word integers, so accumulation never rounds and never
//! cancels. Merging partial accumulators adds the three components, which is
//! associative and commutative: any partitioning of the input, merged in any
//! order, yields the identical state.
//!
//! The variance is produced from the exact precursor
//! `D = n * sum(x^2) - sum(x)^2` divided by `n * (n - 1)` (unbiased) or
//! `n * n` (biased), with a single final rounding (see
//! [`precursor`](crate::precursor)).
//!
//! # Limits
//!
//! The sum is an [`Int128`] and the sum of squares a 192-bit [`SquareSum`].
//! Neither can wrap before 2^64 samples of any 64-bit values have been
//! accepted, which the `u64` count bounds anyway.

use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::precursor::Precursor;
use crate::{Int128, Sample, SquareSum};

/// Streaming variance accumulator over `i32` or `i64` samples.
///
/// # Examples
/// ```
/// use u_moments::LongVariance;
/// let mut acc = LongVariance::new();
/// for x in [2, 4, 4, 4, 5, 5, 7, 9] {
///     acc.accept(x);
/// }
/// assert_eq!(acc.result(true), 4.0);
/// assert_eq!(acc.result(false), 32.0 / 7.0);
///
/// // partial accumulators merge exactly
/// let mut left = LongVariance::from_slice(&[2, 4, 4, 4]);
/// left.combine(&LongVariance::from_slice(&[5, 5, 7, 9]));
/// assert_eq!(left, acc);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarianceAccumulator<T> {
    sum: Int128,
    sum_sq: SquareSum,
    n: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    sample: PhantomData<fn(T)>,
}

/// Variance of 32-bit samples.
pub type IntVariance = VarianceAccumulator<i32>;

/// Variance of 64-bit samples.
pub type LongVariance = VarianceAccumulator<i64>;

impl<T: Sample> VarianceAccumulator<T> {
    /// Creates a new empty accumulator.
    pub fn new() -> Self {
        Self {
            sum: Int128::ZERO,
            sum_sq: SquareSum::ZERO,
            n: 0,
            sample: PhantomData,
        }
    }

    /// Creates an accumulator holding every element of `values`.
    pub fn from_slice(values: &[T]) -> Self {
        values.iter().copied().collect()
    }

    /// Feeds a new sample into the accumulator.
    pub fn accept(&mut self, value: T) {
        self.n += 1;
        self.sum.add_i64(value.to_i64());
        value.add_square_to(&mut self.sum_sq);
    }

    /// Merges another accumulator into this one.
    ///
    /// Exact, associative and commutative, so partial accumulators from
    /// independent partitions can be merged in any grouping and order.
    pub fn combine(&mut self, other: &Self) -> &mut Self {
        self.n += other.n;
        self.sum.add(other.sum);
        self.sum_sq.merge(other.sum_sq);
        self
    }

    /// Returns the merge of `self` and `other`, leaving both untouched.
    pub fn combined(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.combine(other);
        merged
    }

    /// Returns the variance: population (`n` denominator) when `biased`,
    /// sample (`n - 1` denominator) otherwise.
    ///
    /// # Returns
    /// - NaN if no samples have been added.
    /// - `0.0` for a single sample, in both modes.
    /// - Otherwise the exact variance rounded to `f64`, within one ULP of
    ///   the correctly rounded value.
    pub fn result(&self, biased: bool) -> f64 {
        match self.n {
            0 => f64::NAN,
            1 => 0.0,
            n => {
                let n_wide = n as u128;
                let divisor = if biased {
                    n_wide * n_wide
                } else {
                    n_wide * (n_wide - 1)
                };
                Precursor::new(self.sum, self.sum_sq, n).divide(divisor)
            }
        }
    }

    /// Returns the standard deviation, `sqrt(result(biased))`.
    pub fn std_dev(&self, biased: bool) -> f64 {
        self.result(biased).sqrt()
    }

    /// Returns the number of samples seen so far.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Exact sum of the samples.
    pub fn sum(&self) -> Int128 {
        self.sum
    }

    /// Exact sum of the squared samples.
    pub fn sum_sq(&self) -> SquareSum {
        self.sum_sq
    }
}

impl<T: Sample> Default for VarianceAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> FromIterator<T> for VarianceAccumulator<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

impl<T: Sample> Extend<T> for VarianceAccumulator<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.accept(value);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
