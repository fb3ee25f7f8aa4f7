//! Errors raised at the conversion boundary of the wide integer types.
//!
//! Arithmetic on [`UInt128`](crate::UInt128) and [`Int128`](crate::Int128)
//! never fails: it wraps modulo 2^128. Only conversions from text or from
//! arbitrary-precision values can be rejected.

/// Error type for conversions into the 128-bit integer types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WideIntError {
    /// The value needs more than 128 bits in the target representation.
    OutOfRange(String),
    /// The text contains a character that is not a decimal digit.
    InvalidDigit(String),
    /// The text contains no digits.
    Empty,
}

impl std::fmt::Display for WideIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WideIntError::OutOfRange(value) => {
                write!(f, "value out of 128-bit range: {value}")
            }
            WideIntError::InvalidDigit(text) => {
                write!(f, "invalid digit in integer literal: {text:?}")
            }
            WideIntError::Empty => write!(f, "cannot parse integer from empty string"),
        }
    }
}

impl std::error::Error for WideIntError {}
