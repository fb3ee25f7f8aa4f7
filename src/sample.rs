//! Integer sample widths accepted by the accumulators.
//!
//! The 32-bit and 64-bit accumulators differ only in how the square of one
//! sample is widened before it enters the sum of squares; that difference
//! lives here so the accumulators stay generic.

use num_bigint::BigUint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::UInt128;

/// Exact sum of squares held in 192 bits: a [`UInt128`] plus a count of the
/// times it carried past 2^128.
///
/// A square of a 64-bit sample is at most 2^126, so the total cannot wrap
/// before 2^66 samples have been accumulated.
///
/// # Examples
/// ```
/// use u_moments::{Sample, SquareSum};
/// let mut s = SquareSum::ZERO;
/// for _ in 0..4 {
///     i64::MIN.add_square_to(&mut s);
/// }
/// // 4 * 2^126 = 2^128
/// assert_eq!((s.carries(), s.low().as_u128()), (1, 0));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SquareSum {
    carries: u64,
    low: UInt128,
}

impl SquareSum {
    pub const ZERO: Self = Self {
        carries: 0,
        low: UInt128::ZERO,
    };

    pub const fn from_parts(carries: u64, low: UInt128) -> Self {
        Self { carries, low }
    }

    /// Number of whole multiples of 2^128 in the sum.
    pub const fn carries(self) -> u64 {
        self.carries
    }

    /// The sum modulo 2^128.
    pub const fn low(self) -> UInt128 {
        self.low
    }

    /// The sum as a [`UInt128`], if it is below 2^128.
    pub fn to_u128(self) -> Option<UInt128> {
        (self.carries == 0).then_some(self.low)
    }

    /// Adds a 128-bit term, counting the carry.
    pub fn add(&mut self, term: UInt128) {
        if self.low.add_carrying(term) {
            self.carries += 1;
        }
    }

    /// Merges another partial sum.
    pub fn merge(&mut self, other: SquareSum) {
        self.carries += other.carries;
        self.add(other.low);
    }

    /// Exact arbitrary-precision value.
    pub fn to_biguint(self) -> BigUint {
        (BigUint::from(self.carries) << 128_usize) + self.low.to_biguint()
    }
}

/// An integer sample that can be accumulated exactly.
pub trait Sample: Copy {
    /// Sign-extends the sample to 64 bits.
    fn to_i64(self) -> i64;

    /// Adds the exact square of the sample to `sum_sq`.
    fn add_square_to(self, sum_sq: &mut SquareSum);
}

impl Sample for i32 {
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    /// `|x| <= 2^31` so `x^2 <= 2^62` fits a signed 64-bit word, and fewer
    /// than 2^64 such squares stay below 2^126: the low word never carries.
    #[inline]
    fn add_square_to(self, sum_sq: &mut SquareSum) {
        let x = self as i64;
        sum_sq.low.add_positive(x * x);
    }
}

impl Sample for i64 {
    #[inline]
    fn to_i64(self) -> i64 {
        self
    }

    /// `x^2 <= 2^126` needs the full 64x64 -> 128-bit product, and a handful
    /// of them reach 2^128.
    #[inline]
    fn add_square_to(self, sum_sq: &mut SquareSum) {
        let x = self.unsigned_abs();
        sum_sq.add(UInt128::widening_mul(x, x));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_extremes() {
        let mut acc = SquareSum::ZERO;
        i32::MIN.add_square_to(&mut acc);
        assert_eq!(acc.low().as_u128(), 1 << 62);
        i32::MAX.add_square_to(&mut acc);
        assert_eq!(acc.low().as_u128(), (1 << 62) + (i32::MAX as u128).pow(2));
        assert_eq!(acc.carries(), 0);
        assert_eq!(i32::MIN.to_i64(), -(1 << 31));
    }

    #[test]
    fn test_i64_extremes() {
        let mut acc = SquareSum::ZERO;
        i64::MIN.add_square_to(&mut acc);
        assert_eq!(acc.to_u128().map(UInt128::as_u128), Some(1 << 126));
        (-3_i64).add_square_to(&mut acc);
        assert_eq!(acc.low().as_u128(), (1 << 126) + 9);
        assert_eq!(i64::MIN.to_i64(), i64::MIN);
    }

    #[test]
    fn test_i64_sum_of_squares_carries_past_2_pow_128() {
        // four squares of -2^63 sum to exactly 2^128
        let mut acc = SquareSum::ZERO;
        for _ in 0..4 {
            i64::MIN.add_square_to(&mut acc);
        }
        assert_eq!(acc, SquareSum::from_parts(1, UInt128::ZERO));
        assert_eq!(acc.to_u128(), None);
        assert_eq!(acc.to_biguint(), BigUint::from(1_u32) << 128_usize);
    }

    #[test]
    fn test_many_extremes_match_bigint() {
        let mut acc = SquareSum::ZERO;
        let mut expected = BigUint::from(0_u32);
        for k in 0..1000_i64 {
            let x = if k % 2 == 0 { i64::MIN } else { i64::MAX - k };
            x.add_square_to(&mut acc);
            expected += BigUint::from(x.unsigned_abs()).pow(2);
        }
        assert_eq!(acc.to_biguint(), expected);
        assert!(acc.carries() > 100);
    }

    #[test]
    fn test_merge_counts_both_carries() {
        let mut a = SquareSum::from_parts(2, UInt128::MAX);
        a.merge(SquareSum::from_parts(3, UInt128::from_u64(1)));
        assert_eq!(a, SquareSum::from_parts(6, UInt128::ZERO));

        let mut b = SquareSum::from_parts(1, UInt128::from_u64(5));
        b.merge(SquareSum::from_parts(0, UInt128::from_u64(7)));
        assert_eq!(b, SquareSum::from_parts(1, UInt128::from_u64(12)));
    }
}
