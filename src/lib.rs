//! # u-moments
//!
//! Exact streaming moments (mean, variance) over integer samples.
//!
//! Sums are accumulated in 128-bit integers and sums of squares in 192 bits,
//! so accumulation never overflows and never loses precision to
//! floating-point cancellation. The result is rounded to `f64` once, at the
//! very end, through an exact integer precursor and double-double division.
//! Accumulators merge exactly, so input can be partitioned, reduced in
//! parallel, and combined in any order.
//!
//! ## Modules
//!
//! - [`uint128`]: unsigned 128-bit two-word integer with explicit carries
//! - [`int128`]: signed 128-bit two-word integer in two's complement
//! - [`sample`]: the accepted sample widths and the 192-bit sum of squares
//! - [`double_double`]: unevaluated sum of two `f64` with ~106-bit precision
//! - [`variance`]: exact variance accumulator for `i32` and `i64` samples
//! - [`mean`]: exact mean accumulator for `i32` and `i64` samples
//!
//! ## Design Philosophy
//!
//! - **Exact until the last step**: integer state, one final rounding
//! - **Mergeable state**: `combine` is associative and commutative
//! - **Property-based testing**: results checked against arbitrary-precision
//!   references via proptest

pub mod double_double;
pub mod error;
pub mod int128;
pub mod mean;
mod precursor;
pub mod sample;
pub mod uint128;
pub mod variance;

#[cfg(test)]
mod test_support;

pub use double_double::DoubleDouble;
pub use error::WideIntError;
pub use int128::Int128;
pub use mean::{IntMean, LongMean, MeanAccumulator};
pub use sample::{Sample, SquareSum};
pub use uint128::UInt128;
pub use variance::{IntVariance, LongVariance, VarianceAccumulator};
