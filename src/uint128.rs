//! Unsigned 128-bit integer held as two 64-bit words.
//!
//! All arithmetic wraps modulo 2^128. Carries and borrows between the low and
//! high words are propagated explicitly on every operation; there is no
//! overflow trapping. [`add_carrying`](UInt128::add_carrying) reports the
//! carry out of the top word so a caller can keep a wider running total.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DoubleDouble, WideIntError};

/// Non-negative integer `hi * 2^64 + lo` in the range `[0, 2^128)`.
///
/// Field order makes the derived ordering numeric.
///
/// # Examples
/// ```
/// use u_moments::UInt128;
/// let mut x = UInt128::from_u64(u64::MAX);
/// x.add_positive(1);
/// assert_eq!((x.hi(), x.lo()), (1, 0));
/// assert_eq!(x.to_string(), "18446744073709551616");
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UInt128 {
    hi: u64,
    lo: u64,
}

impl UInt128 {
    pub const ZERO: Self = Self { hi: 0, lo: 0 };
    pub const MAX: Self = Self {
        hi: u64::MAX,
        lo: u64::MAX,
    };

    /// Creates a zero value.
    pub const fn new() -> Self {
        Self::ZERO
    }

    /// Creates the value `hi * 2^64 + lo`.
    pub const fn from_parts(hi: u64, lo: u64) -> Self {
        Self { hi, lo }
    }

    pub const fn from_u64(x: u64) -> Self {
        Self { hi: 0, lo: x }
    }

    /// Creates the 96-bit value `hi * 2^64 + lo`.
    pub const fn from_u96(hi: u32, lo: u64) -> Self {
        Self { hi: hi as u64, lo }
    }

    pub const fn from_u128(x: u128) -> Self {
        Self {
            hi: (x >> 64) as u64,
            lo: x as u64,
        }
    }

    pub const fn as_u128(self) -> u128 {
        ((self.hi as u128) << 64) | self.lo as u128
    }

    /// Exact 128-bit product of two 64-bit words.
    pub const fn widening_mul(a: u64, b: u64) -> Self {
        Self::from_u128(a as u128 * b as u128)
    }

    /// High 64 bits.
    pub const fn hi(self) -> u64 {
        self.hi
    }

    /// Low 64 bits.
    pub const fn lo(self) -> u64 {
        self.lo
    }

    pub const fn is_zero(self) -> bool {
        self.hi == 0 && self.lo == 0
    }

    /// Adds `x` reinterpreted as an unsigned 64-bit word.
    ///
    /// The caller guarantees `x` is semantically non-negative; a bit pattern
    /// with the top bit set (including `i64::MIN`) is read as the unsigned
    /// value `2^63 + ...`, never as a negative number.
    pub fn add_positive(&mut self, x: i64) {
        let (lo, carry) = self.lo.overflowing_add(x as u64);
        self.lo = lo;
        self.hi = self.hi.wrapping_add(carry as u64);
    }

    /// Adds `other`, wrapping modulo 2^128.
    pub fn add(&mut self, other: UInt128) {
        self.add_carrying(other);
    }

    /// Adds `other` modulo 2^128 and returns the carry out of bit 127.
    ///
    /// Callers that count the carries extend the value past 128 bits.
    pub fn add_carrying(&mut self, other: UInt128) -> bool {
        let (lo, carry_lo) = self.lo.overflowing_add(other.lo);
        let (hi, carry_a) = self.hi.overflowing_add(other.hi);
        let (hi, carry_b) = hi.overflowing_add(carry_lo as u64);
        self.lo = lo;
        self.hi = hi;
        carry_a || carry_b
    }

    /// Subtracts `other`, wrapping modulo 2^128.
    pub fn subtract(&mut self, other: UInt128) {
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        self.lo = lo;
        self.hi = self.hi.wrapping_sub(other.hi).wrapping_sub(borrow as u64);
    }

    /// Multiplies by an unsigned 32-bit factor, wrapping modulo 2^128.
    ///
    /// The product is exact whenever the true product is below 2^128; use
    /// [`overflowing_mul_u32`](Self::overflowing_mul_u32) to detect the
    /// other case.
    pub fn mul_u32(&self, m: u32) -> UInt128 {
        self.overflowing_mul_u32(m).0
    }

    /// Multiplies by an unsigned 32-bit factor, returning the wrapped product
    /// and whether the true product needed more than 128 bits.
    pub fn overflowing_mul_u32(&self, m: u32) -> (UInt128, bool) {
        let m = m as u128;
        // lo * m < 2^96: the upper 32 bits carry into the high word
        let low = self.lo as u128 * m;
        let high = self.hi as u128 * m + (low >> 64);
        let product = UInt128 {
            hi: high as u64,
            lo: low as u64,
        };
        (product, high >> 64 != 0)
    }

    /// Nearest `f64`, ties to even.
    pub fn to_f64(self) -> f64 {
        self.as_u128() as f64
    }

    /// Nearest double-double value.
    ///
    /// Values below 2^106 convert exactly; wider values keep the leading
    /// ~106 bits.
    pub fn to_double_double(self) -> DoubleDouble {
        DoubleDouble::from_u128(self.as_u128())
    }

    /// Exact arbitrary-precision value.
    pub fn to_biguint(self) -> BigUint {
        BigUint::from(self.as_u128())
    }
}

impl From<u32> for UInt128 {
    fn from(x: u32) -> Self {
        Self::from_u64(x as u64)
    }
}

impl From<u64> for UInt128 {
    fn from(x: u64) -> Self {
        Self::from_u64(x)
    }
}

impl From<u128> for UInt128 {
    fn from(x: u128) -> Self {
        Self::from_u128(x)
    }
}

impl TryFrom<&BigUint> for UInt128 {
    type Error = WideIntError;

    fn try_from(value: &BigUint) -> Result<Self, Self::Error> {
        value
            .to_u128()
            .map(Self::from_u128)
            .ok_or_else(|| WideIntError::OutOfRange(value.to_string()))
    }
}

impl fmt::Display for UInt128 {
    /// Exact decimal representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_u128(), f)
    }
}

impl FromStr for UInt128 {
    type Err = WideIntError;

    /// Parses a decimal literal with an optional leading `+`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('+').unwrap_or(s);
        if digits.is_empty() {
            return Err(WideIntError::Empty);
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WideIntError::InvalidDigit(s.to_string()));
        }
        digits
            .parse::<u128>()
            .map(Self::from_u128)
            .map_err(|_| WideIntError::OutOfRange(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
