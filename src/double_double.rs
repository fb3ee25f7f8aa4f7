//! Double-double (two-word) extended-precision floating point.
//!
//! A value is the unevaluated sum `hi + lo` of two `f64` words with
//! `|lo| <= ulp(hi) / 2`, giving about 106 significant bits. Every operation
//! finishes with an error-free renormalization so the invariant holds for
//! every result.
//!
//! # Algorithms
//!
//! - **TwoSum / FastTwoSum**: error-free addition (Knuth; Dekker).
//! - **TwoProd**: error-free multiplication via fused multiply-add.
//! - **Arithmetic**: the FMA-based double-word algorithms of Joldes, Muller
//!   & Popescu, with relative error bounds of a few units of 2^-106:
//!   addition 3u², multiplication 4u², division by a double 3u², division
//!   by a double-double 15u² (u = 2^-53).
//!
//! References:
//! - Dekker (1971), "A Floating-Point Technique for Extending the Available
//!   Precision", *Numerische Mathematik* 18(3).
//! - Joldes, Muller & Popescu (2017), "Tight and Rigorous Error Bounds for
//!   Basic Building Blocks of Double-Word Arithmetic", *ACM TOMS* 44(2).
//!
//! # Non-finite values
//!
//! Infinities and NaN follow ordinary `f64` contagion: when the leading
//! approximation of a result is not finite, that value is returned with a
//! zero low word.

use std::ops::{Add, Div, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const TWO_POW_127: f64 = 170141183460469231731687303715884105728.0;
const TWO_POW_128: f64 = 340282366920938463463374607431768211456.0;

// ---------------------------------------------------------------------------
// Error-free transformations
// ---------------------------------------------------------------------------

/// Returns `(s, e)` with `s = fl(a + b)` and `s + e = a + b` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let v = s - a;
    let e = (a - (s - v)) + (b - v);
    (s, e)
}

/// [`two_sum`] for `|a| >= |b|`.
#[inline]
fn fast_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// Returns `(p, e)` with `p = fl(a * b)` and `p + e = a * b` exactly.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

// ---------------------------------------------------------------------------
// DoubleDouble
// ---------------------------------------------------------------------------

/// Extended-precision value `hi + lo`.
///
/// # Examples
/// ```
/// use u_moments::DoubleDouble;
/// // 1/3 to ~32 digits, then back to the nearest double
/// let third = DoubleDouble::from_f64(1.0) / DoubleDouble::from_f64(3.0);
/// assert_eq!(third.to_f64(), 1.0 / 3.0);
/// assert!(third.lo() != 0.0);
/// // 2^53 + 1 is not a double, but is a double-double
/// let x = DoubleDouble::from_u64((1 << 53) + 1);
/// assert_eq!((x.hi(), x.lo()), (9007199254740992.0, 1.0));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct DoubleDouble {
    hi: f64,
    lo: f64,
}

impl DoubleDouble {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };
    pub const ONE: Self = Self { hi: 1.0, lo: 0.0 };

    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Creates the normalized value of `hi + lo`.
    pub fn new(hi: f64, lo: f64) -> Self {
        let (hi, lo) = two_sum(hi, lo);
        if hi.is_finite() {
            Self { hi, lo }
        } else {
            Self::from_f64(hi)
        }
    }

    pub const fn from_f64(x: f64) -> Self {
        Self { hi: x, lo: 0.0 }
    }

    /// Exact conversion.
    pub fn from_i64(x: i64) -> Self {
        Self::from_i128(x as i128)
    }

    /// Exact conversion.
    pub fn from_u64(x: u64) -> Self {
        Self::from_u128(x as u128)
    }

    /// Nearest double-double; exact when `|x| < 2^106`.
    pub fn from_i128(x: i128) -> Self {
        let hi = x as f64;
        // hi may round up to 2^127, outside i128; the wrapped difference
        // is still the exact residual
        let back = if hi >= TWO_POW_127 {
            i128::MIN
        } else {
            hi as i128
        };
        let lo = x.wrapping_sub(back) as f64;
        let (hi, lo) = fast_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Nearest double-double; exact when `x < 2^106`.
    pub fn from_u128(x: u128) -> Self {
        let hi = x as f64;
        // 2^128 wraps to 0 modulo 2^128
        let back = if hi >= TWO_POW_128 { 0 } else { hi as u128 };
        let lo = x.wrapping_sub(back) as i128 as f64;
        let (hi, lo) = fast_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Leading word: the nearest `f64` to the represented value.
    pub const fn hi(self) -> f64 {
        self.hi
    }

    /// Trailing correction word.
    pub const fn lo(self) -> f64 {
        self.lo
    }

    /// Rounds to the nearest `f64`.
    ///
    /// After normalization the leading word already is that value.
    pub const fn to_f64(self) -> f64 {
        self.hi
    }

    pub fn is_finite(self) -> bool {
        self.hi.is_finite()
    }

    pub fn is_sign_negative(self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }

    pub fn abs(self) -> Self {
        if self.is_sign_negative() {
            -self
        } else {
            self
        }
    }

    /// Adds a double.
    pub fn add_f64(self, y: f64) -> Self {
        let (sh, sl) = two_sum(self.hi, y);
        if !sh.is_finite() {
            return Self::from_f64(sh);
        }
        let v = self.lo + sl;
        let (hi, lo) = fast_two_sum(sh, v);
        Self { hi, lo }
    }

    /// Multiplies by a double.
    pub fn mul_f64(self, y: f64) -> Self {
        let (ch, cl1) = two_prod(self.hi, y);
        if !ch.is_finite() {
            return Self::from_f64(ch);
        }
        let cl3 = self.lo.mul_add(y, cl1);
        let (hi, lo) = fast_two_sum(ch, cl3);
        Self { hi, lo }
    }

    /// Divides by a double.
    pub fn div_f64(self, y: f64) -> Self {
        let th = self.hi / y;
        if !th.is_finite() || !y.is_finite() {
            return Self::from_f64(th);
        }
        let (ph, pl) = two_prod(th, y);
        let dh = self.hi - ph;
        let dl = self.lo - pl;
        let d = dh + dl;
        let tl = d / y;
        let (hi, lo) = fast_two_sum(th, tl);
        Self { hi, lo }
    }

    /// Divides by an integer, converting the divisor exactly.
    pub fn div_u64(self, n: u64) -> Self {
        let divisor = Self::from_u64(n);
        if divisor.lo == 0.0 {
            self.div_f64(divisor.hi)
        } else {
            self / divisor
        }
    }

    pub fn square(self) -> Self {
        let (ch, cl1) = two_prod(self.hi, self.hi);
        if !ch.is_finite() {
            return Self::from_f64(ch);
        }
        // lo^2 is below the working precision
        let cl2 = (2.0 * self.hi).mul_add(self.lo, cl1);
        let (hi, lo) = fast_two_sum(ch, cl2);
        Self { hi, lo }
    }
}

impl From<f64> for DoubleDouble {
    fn from(x: f64) -> Self {
        Self::from_f64(x)
    }
}

impl From<i64> for DoubleDouble {
    fn from(x: i64) -> Self {
        Self::from_i64(x)
    }
}

impl From<u64> for DoubleDouble {
    fn from(x: u64) -> Self {
        Self::from_u64(x)
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

impl Neg for DoubleDouble {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (sh, sl) = two_sum(self.hi, rhs.hi);
        if !sh.is_finite() {
            return Self::from_f64(sh);
        }
        let (th, tl) = two_sum(self.lo, rhs.lo);
        let c = sl + th;
        let (vh, vl) = fast_two_sum(sh, c);
        let w = tl + vl;
        let (hi, lo) = fast_two_sum(vh, w);
        Self { hi, lo }
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let (ch, cl1) = two_prod(self.hi, rhs.hi);
        if !ch.is_finite() {
            return Self::from_f64(ch);
        }
        let tl0 = self.lo * rhs.lo;
        let tl1 = self.hi.mul_add(rhs.lo, tl0);
        let cl2 = self.lo.mul_add(rhs.hi, tl1);
        let cl3 = cl1 + cl2;
        let (hi, lo) = fast_two_sum(ch, cl3);
        Self { hi, lo }
    }
}

impl Div for DoubleDouble {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let th = self.hi / rhs.hi;
        if !th.is_finite() || !rhs.hi.is_finite() {
            return Self::from_f64(th);
        }
        let r = rhs.mul_f64(th);
        // exact by Sterbenz: r.hi is within a few ulps of self.hi
        let pi_h = self.hi - r.hi;
        let delta_l = self.lo - r.lo;
        let delta = pi_h + delta_l;
        let tl = delta / rhs.hi;
        let (hi, lo) = fast_two_sum(th, tl);
        Self { hi, lo }
    }
}

impl Add<f64> for DoubleDouble {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        self.add_f64(rhs)
    }
}

impl Sub<f64> for DoubleDouble {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        self.add_f64(-rhs)
    }
}

impl Mul<f64> for DoubleDouble {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.mul_f64(rhs)
    }
}

impl Div<f64> for DoubleDouble {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.div_f64(rhs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
