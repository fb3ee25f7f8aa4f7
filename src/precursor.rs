//! Exact variance precursor and its reduction to `f64`.
//!
//! The precursor `D = n * sum(x^2) - sum(x)^2` equals `n` times the sum of
//! squared deviations from the mean, so it is a non-negative integer for any
//! consistent accumulator state. It is formed exactly and only the final
//! division rounds.
//!
//! # Routing
//!
//! - **Fixed width** when `n < 2^32`, `|sum| < 2^64`, `sum_sq < 2^128` and
//!   `n * sum_sq` does not overflow 128 bits: `sum^2 < 2^128` then comes
//!   from one 64x64 multiply and `n * sum_sq` from one 128x32 multiply.
//! - **Arbitrary precision** otherwise (`D < 2^256`).
//!
//! The division is a single `f64` division when both `D` and the divisor are
//! below 2^53, which makes the result correctly rounded. Otherwise both are
//! converted to [`DoubleDouble`] and divided there, so the only significant
//! rounding is the final conversion to `f64`.

use log::trace;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive};

use crate::{DoubleDouble, Int128, SquareSum, UInt128};

/// Every non-negative integer below this bound is exactly an `f64`.
pub(crate) const EXACT_F64_LIMIT: u64 = 1 << 53;

/// Exact value of `n * sum_sq - sum^2`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Precursor {
    Fixed(UInt128),
    /// Negative only for a state no sequence of samples produces.
    Wide(BigInt),
}

impl Precursor {
    pub(crate) fn new(sum: Int128, sum_sq: SquareSum, n: u64) -> Self {
        match Self::fixed_width(sum, sum_sq, n) {
            Some(d) => Precursor::Fixed(d),
            None => {
                trace!("variance precursor needs more than 128 bits (n = {n}, sum = {sum})");
                let s = sum.to_bigint();
                Precursor::Wide(BigInt::from(sum_sq.to_biguint()) * n - &s * &s)
            }
        }
    }

    fn fixed_width(sum: Int128, sum_sq: SquareSum, n: u64) -> Option<UInt128> {
        let n = u32::try_from(n).ok()?;
        let sum_sq = sum_sq.to_u128()?;
        let abs = sum.wrapping_abs();
        // MIN stays negative under wrapping_abs, so its high word is nonzero
        if abs.hi() != 0 {
            return None;
        }
        let (mut d, overflow) = sum_sq.overflowing_mul_u32(n);
        if overflow {
            return None;
        }
        let square = abs.square_low();
        if square > d {
            // inconsistent state; the variance clamps to zero
            return Some(UInt128::ZERO);
        }
        d.subtract(square);
        Some(d)
    }

    fn is_negative(&self) -> bool {
        match self {
            Precursor::Fixed(_) => false,
            Precursor::Wide(d) => d.is_negative(),
        }
    }

    fn is_exact_f64(&self) -> bool {
        match self {
            Precursor::Fixed(d) => d.hi() == 0 && d.lo() < EXACT_F64_LIMIT,
            Precursor::Wide(d) => d.magnitude().bits() <= 53,
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Precursor::Fixed(d) => d.to_f64(),
            Precursor::Wide(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    fn to_double_double(&self) -> DoubleDouble {
        match self {
            Precursor::Fixed(d) => d.to_double_double(),
            Precursor::Wide(d) => {
                let hi = d.to_f64().unwrap_or(f64::NAN);
                match BigInt::from_f64(hi) {
                    // the residual is exact; rounding it keeps ~106 bits
                    Some(lead) => DoubleDouble::new(hi, (d - lead).to_f64().unwrap_or(0.0)),
                    None => DoubleDouble::from_f64(hi),
                }
            }
        }
    }

    /// Divides by `divisor` and rounds to `f64`, clamping negative
    /// precursors to zero.
    pub(crate) fn divide(&self, divisor: u128) -> f64 {
        if self.is_negative() {
            trace!("negative variance precursor clamped to zero");
            return 0.0;
        }
        if self.is_exact_f64() && divisor < EXACT_F64_LIMIT as u128 {
            return self.to_f64() / divisor as f64;
        }
        trace!("variance divided in double-double precision (divisor = {divisor})");
        let q = self.to_double_double() / UInt128::from_u128(divisor).to_double_double();
        q.to_f64().max(0.0)
    }
}
