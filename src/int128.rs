//! Signed 128-bit two's-complement integer held as two 64-bit words.
//!
//! Shares the word layout and wraparound rules of [`UInt128`]: every
//! operation wraps modulo 2^128 and never traps. The running sum of a
//! practically sized array of 64-bit samples stays far inside
//! `[-2^127, 2^127)`.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DoubleDouble, UInt128, WideIntError};

/// Two's-complement integer `hi * 2^64 + lo` in the range `[-2^127, 2^127)`.
///
/// The high word carries the sign; the low word is always read unsigned.
///
/// # Examples
/// ```
/// use u_moments::Int128;
/// let mut s = Int128::new();
/// s.add_i64(i64::MIN);
/// assert_eq!(s.square().to_string(), "85070591730234615865843651857942052864");
/// s.add_i64(i64::MIN);
/// assert_eq!(s.as_i128(), 2 * i64::MIN as i128);
/// assert_eq!(s.to_string(), "-18446744073709551616");
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int128 {
    hi: i64,
    lo: u64,
}

impl Int128 {
    pub const ZERO: Self = Self { hi: 0, lo: 0 };
    pub const MIN: Self = Self { hi: i64::MIN, lo: 0 };
    pub const MAX: Self = Self {
        hi: i64::MAX,
        lo: u64::MAX,
    };

    /// Creates a zero value.
    pub const fn new() -> Self {
        Self::ZERO
    }

    pub const fn from_parts(hi: i64, lo: u64) -> Self {
        Self { hi, lo }
    }

    /// Sign-extends `x` into the high word.
    pub const fn from_i64(x: i64) -> Self {
        Self {
            hi: x >> 63,
            lo: x as u64,
        }
    }

    pub const fn from_i128(x: i128) -> Self {
        Self {
            hi: (x >> 64) as i64,
            lo: x as u64,
        }
    }

    pub const fn as_i128(self) -> i128 {
        ((self.hi as i128) << 64) | self.lo as i128
    }

    /// High 64 bits, carrying the sign.
    pub const fn hi(self) -> i64 {
        self.hi
    }

    /// Low 64 bits.
    pub const fn lo(self) -> u64 {
        self.lo
    }

    pub const fn is_negative(self) -> bool {
        self.hi < 0
    }

    /// Adds a sign-extended 64-bit value, wrapping modulo 2^128.
    pub fn add_i64(&mut self, x: i64) {
        let (lo, carry) = self.lo.overflowing_add(x as u64);
        self.lo = lo;
        self.hi = self.hi.wrapping_add(x >> 63).wrapping_add(carry as i64);
    }

    /// Same result as [`add_i64`](Self::add_i64), deriving the carry with
    /// bitwise logic instead of a flag.
    pub fn add_i64_branchless(&mut self, x: i64) {
        let a = self.lo;
        let b = x as u64;
        let s = a.wrapping_add(b);
        // carry out of bit 63: both top bits set, or one set and the sum's clear
        let carry = ((a & b) | ((a | b) & !s)) >> 63;
        self.lo = s;
        self.hi = self.hi.wrapping_add((x >> 63) + carry as i64);
    }

    /// Adds `other`, wrapping modulo 2^128.
    pub fn add(&mut self, other: Int128) {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        self.lo = lo;
        self.hi = self.hi.wrapping_add(other.hi).wrapping_add(carry as i64);
    }

    /// Subtracts `other`, wrapping modulo 2^128.
    pub fn subtract(&mut self, other: Int128) {
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        self.lo = lo;
        self.hi = self.hi.wrapping_sub(other.hi).wrapping_sub(borrow as i64);
    }

    /// Two's-complement negation; `MIN` maps to itself.
    pub fn wrapping_neg(self) -> Int128 {
        let lo = (!self.lo).wrapping_add(1);
        let hi = (!self.hi).wrapping_add((lo == 0) as i64);
        Int128 { hi, lo }
    }

    /// Absolute value; `MIN` maps to itself.
    pub fn wrapping_abs(self) -> Int128 {
        if self.is_negative() {
            self.wrapping_neg()
        } else {
            self
        }
    }

    /// Magnitude as an unsigned value, exact for every input including `MIN`.
    pub fn unsigned_abs(self) -> UInt128 {
        let abs = self.wrapping_abs();
        UInt128::from_parts(abs.hi as u64, abs.lo)
    }

    /// Square of the value modulo 2^128.
    ///
    /// Exact whenever `|self| < 2^64`.
    pub fn square(self) -> UInt128 {
        let abs = self.unsigned_abs();
        let low = abs.lo() as u128 * abs.lo() as u128;
        // (h*2^64 + l)^2 = h^2*2^128 + 2hl*2^64 + l^2; only 2hl's low word survives
        let cross = abs.hi().wrapping_mul(abs.lo()).wrapping_mul(2);
        UInt128::from_parts(((low >> 64) as u64).wrapping_add(cross), low as u64)
    }

    /// Square of the low word read unsigned.
    ///
    /// Equals [`square`](Self::square) when the caller has established that
    /// the value lies in `[0, 2^64)`, i.e. the high word is zero.
    pub fn square_low(self) -> UInt128 {
        UInt128::widening_mul(self.lo, self.lo)
    }

    /// Nearest `f64`, ties to even.
    pub fn to_f64(self) -> f64 {
        self.as_i128() as f64
    }

    /// Nearest double-double value.
    pub fn to_double_double(self) -> DoubleDouble {
        DoubleDouble::from_i128(self.as_i128())
    }

    /// Exact arbitrary-precision value.
    pub fn to_bigint(self) -> BigInt {
        BigInt::from(self.as_i128())
    }
}

impl From<i32> for Int128 {
    fn from(x: i32) -> Self {
        Self::from_i64(x as i64)
    }
}

impl From<i64> for Int128 {
    fn from(x: i64) -> Self {
        Self::from_i64(x)
    }
}

impl From<i128> for Int128 {
    fn from(x: i128) -> Self {
        Self::from_i128(x)
    }
}

impl TryFrom<&BigInt> for Int128 {
    type Error = WideIntError;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        value
            .to_i128()
            .map(Self::from_i128)
            .ok_or_else(|| WideIntError::OutOfRange(value.to_string()))
    }
}

impl fmt::Display for Int128 {
    /// Exact decimal representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_i128(), f)
    }
}

impl FromStr for Int128 {
    type Err = WideIntError;

    /// Parses a decimal literal with an optional leading `+` or `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('-')
            .or_else(|| s.strip_prefix('+'))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(WideIntError::Empty);
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WideIntError::InvalidDigit(s.to_string()));
        }
        s.parse::<i128>()
            .map(Self::from_i128)
            .map_err(|_| WideIntError::OutOfRange(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
