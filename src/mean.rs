//! Exact streaming mean over integer samples.
//!
//! Keeps the exact 128-bit sum and the count; the mean rounds once, at the
//! final division. A 128-bit sum of 64-bit samples cannot wrap before 2^64
//! samples have been accepted.

use std::marker::PhantomData;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::precursor::EXACT_F64_LIMIT;
use crate::{Int128, Sample};

/// Streaming mean accumulator over `i32` or `i64` samples.
///
/// # Examples
/// ```
/// use u_moments::LongMean;
/// let mut acc = LongMean::new();
/// acc.accept(i64::MAX);
/// acc.accept(i64::MAX);
/// assert_eq!(acc.result(), i64::MAX as f64);
/// assert!(LongMean::new().result().is_nan());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeanAccumulator<T> {
    sum: Int128,
    n: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    sample: PhantomData<fn(T)>,
}

/// Mean of 32-bit samples.
pub type IntMean = MeanAccumulator<i32>;

/// Mean of 64-bit samples.
pub type LongMean = MeanAccumulator<i64>;

impl<T: Sample> MeanAccumulator<T> {
    /// Creates a new empty accumulator.
    pub fn new() -> Self {
        Self {
            sum: Int128::ZERO,
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
    }

    /// Merges another accumulator into this one. Exact, associative and
    /// commutative.
    pub fn combine(&mut self, other: &Self) -> &mut Self {
        self.n += other.n;
        self.sum.add(other.sum);
        self
    }

    /// Returns the merge of `self` and `other`, leaving both untouched.
    pub fn combined(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.combine(other);
        merged
    }

    /// Returns the arithmetic mean, or NaN if no samples have been added.
    pub fn result(&self) -> f64 {
        if self.n == 0 {
            return f64::NAN;
        }
        let sum = self.sum.as_i128();
        if sum.unsigned_abs() < EXACT_F64_LIMIT as u128 && self.n < EXACT_F64_LIMIT {
            return sum as f64 / self.n as f64;
        }
        trace!("mean divided in double-double precision (n = {})", self.n);
        self.sum.to_double_double().div_u64(self.n).to_f64()
    }

    /// Returns the number of samples seen so far.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Exact sum of the samples.
    pub fn sum(&self) -> Int128 {
        self.sum
    }
}

impl<T: Sample> Default for MeanAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> FromIterator<T> for MeanAccumulator<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

impl<T: Sample> Extend<T> for MeanAccumulator<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.accept(value);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_support::{reference_mean, ulp_distance};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn mean_matches_reference(data in proptest::collection::vec(any::<i64>(), 1..300)) {
            let got = LongMean::from_slice(&data).result();
            let expected = reference_mean(&data);
            prop_assert!(ulp_distance(got, expected) <= 1, "got {} expected {}", got, expected);
        }

        #[test]
        fn small_mean_is_correctly_rounded(
            data in proptest::collection::vec(-(1_i32 << 20)..(1_i32 << 20), 1..300),
        ) {
            let wide: Vec<i64> = data.iter().map(|&x| x as i64).collect();
            prop_assert_eq!(IntMean::from_slice(&data).result(), reference_mean(&wide));
        }

        #[test]
        fn combine_is_order_independent(
            a in proptest::collection::vec(any::<i64>(), 0..50),
            b in proptest::collection::vec(any::<i64>(), 0..50),
        ) {
            let (a, b) = (LongMean::from_slice(&a), LongMean::from_slice(&b));
            prop_assert_eq!(a.combined(&b), b.combined(&a));
        }

        #[test]
        fn mean_within_sample_range(data in proptest::collection::vec(any::<i32>(), 1..100)) {
            let mean = IntMean::from_slice(&data).result();
            let lo = *data.iter().min().unwrap() as f64;
            let hi = *data.iter().max().unwrap() as f64;
            prop_assert!(lo <= mean && mean <= hi);
        }
    }
}
