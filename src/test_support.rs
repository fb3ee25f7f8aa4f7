//! Shared helpers for the unit and property tests.
//!
//! Reference values are computed with unlimited-precision integers so the
//! fixed-width and double-double code paths can be checked against exact
//! arithmetic.

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, ToPrimitive, Zero};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::DoubleDouble;

/// Creates a fast, seeded random number generator.
///
/// The sequence is deterministic for a given seed on the same platform.
pub(crate) fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Returns `2^e` for exponents in the normal range.
pub(crate) fn pow2(e: i32) -> f64 {
    assert!((-1022..=1023).contains(&e), "2^{e} is not a normal f64");
    f64::from_bits(((e + 1023) as u64) << 52)
}

/// Exact value of `x * 2^scale`.
///
/// # Panics
/// If `x` is not finite or `x * 2^scale` is not an integer.
pub(crate) fn scaled(x: f64, scale: i32) -> BigInt {
    assert!(x.is_finite(), "cannot scale non-finite {x}");
    if x == 0.0 {
        return BigInt::zero();
    }
    let bits = x.to_bits();
    let biased_exp = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    // x = mantissa * 2^exp
    let (mantissa, exp) = if biased_exp == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased_exp - 1075)
    };
    let shift = exp + scale;
    let magnitude = if shift >= 0 {
        BigInt::from(mantissa) << (shift as usize)
    } else {
        let drop = (-shift) as u32;
        assert!(
            drop < 64 && mantissa.trailing_zeros() >= drop,
            "scale {scale} too small for {x:e}"
        );
        BigInt::from(mantissa >> drop)
    };
    if x < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Exact value of `(hi + lo) * 2^scale` for a double-double.
pub(crate) fn dd_scaled(x: DoubleDouble, scale: i32) -> BigInt {
    scaled(x.hi(), scale) + scaled(x.lo(), scale)
}

/// Rounds the rational `num / den` to the nearest `f64` (ties to even).
///
/// The quotient is formed with at least 65 significant bits and any nonzero
/// remainder is folded into the lowest bit, so the final integer-to-float
/// conversion rounds exactly once.
pub(crate) fn ratio_to_f64(num: &BigInt, den: &BigUint) -> f64 {
    assert!(!den.is_zero(), "zero denominator");
    if num.is_zero() {
        return 0.0;
    }
    let magnitude = num.magnitude();
    let shift = 65 + den.bits() as i64 - magnitude.bits() as i64;
    let (n, d) = if shift >= 0 {
        (magnitude << (shift as usize), den.clone())
    } else {
        (magnitude.clone(), den << ((-shift) as usize))
    };
    let mut q = (&n / &d).to_u128().expect("quotient has at most 66 bits");
    if !(&n % &d).is_zero() {
        q |= 1;
    }
    let value = q as f64 * pow2(-(shift as i32));
    if num.is_negative() {
        -value
    } else {
        value
    }
}

/// Exact precursor `n * sum(x^2) - sum(x)^2`.
pub(crate) fn exact_precursor(samples: &[i64]) -> BigInt {
    let n = BigInt::from(samples.len());
    let sum: BigInt = samples.iter().map(|&x| BigInt::from(x)).sum();
    let sum_sq: BigInt = samples
        .iter()
        .map(|&x| BigInt::from(x) * BigInt::from(x))
        .sum();
    n * sum_sq - &sum * &sum
}

/// Correctly rounded variance of `samples`.
pub(crate) fn reference_variance(samples: &[i64], biased: bool) -> f64 {
    let n = samples.len() as u64;
    match n {
        0 => f64::NAN,
        1 => 0.0,
        _ => {
            let divisor = if biased {
                BigUint::from(n) * BigUint::from(n)
            } else {
                BigUint::from(n) * BigUint::from(n - 1)
            };
            ratio_to_f64(&exact_precursor(samples), &divisor)
        }
    }
}

/// Correctly rounded mean of `samples`.
pub(crate) fn reference_mean(samples: &[i64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let sum: BigInt = samples.iter().map(|&x| BigInt::from(x)).sum();
    ratio_to_f64(&sum, &BigUint::from(samples.len()))
}

/// Number of representable doubles between `a` and `b`.
pub(crate) fn ulp_distance(a: f64, b: f64) -> u64 {
    fn ordered(x: f64) -> i64 {
        let bits = x.to_bits() as i64;
        if bits < 0 {
            i64::MIN - bits
        } else {
            bits
        }
    }
    (ordered(a) as i128 - ordered(b) as i128).unsigned_abs() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_to_f64_exact_and_ties() {
        let one = BigUint::from(1_u32);
        assert_eq!(ratio_to_f64(&BigInt::from(7), &one), 7.0);
        assert_eq!(ratio_to_f64(&BigInt::from(-3), &BigUint::from(4_u32)), -0.75);
        assert_eq!(ratio_to_f64(&BigInt::from(1), &BigUint::from(3_u32)), 1.0 / 3.0);
        // 2^53 + 1 is a tie between 2^53 and 2^53 + 2; rounds to even.
        let tie = BigInt::from((1_u64 << 53) + 1);
        assert_eq!(ratio_to_f64(&tie, &one), 9007199254740992.0);
        let above = BigInt::from((1_u64 << 53) + 3);
        assert_eq!(ratio_to_f64(&above, &one), 9007199254740996.0);
    }

    #[test]
    fn test_scaled() {
        assert_eq!(scaled(1.5, 1), BigInt::from(3));
        assert_eq!(scaled(-0.25, 2), BigInt::from(-1));
        assert_eq!(scaled(pow2(60), 0), BigInt::from(1_u64 << 60));
    }

    #[test]
    fn test_ulp_distance() {
        assert_eq!(ulp_distance(1.0, 1.0), 0);
        assert_eq!(ulp_distance(1.0, 1.0 + f64::EPSILON), 1);
        assert_eq!(ulp_distance(-0.0, 0.0), 0);
        assert_eq!(ulp_distance(-f64::MIN_POSITIVE, f64::MIN_POSITIVE), 2 << 52);
    }

    #[test]
    fn test_reference_variance_small() {
        let data = [2, 4, 4, 4, 5, 5, 7, 9];
        assert_eq!(reference_variance(&data, true), 4.0);
        assert_eq!(reference_variance(&data, false), 32.0 / 7.0);
        assert_eq!(reference_mean(&data), 5.0);
    }
}
