//! Error module for the gadgets crate

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error as StdError;

/// A limb transition that is absent from its lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `(a16 + b16 + carry_in, sum_lo, sum_hi, carry_out)` of the 16-bit limb
    /// at `limb` is not a row of the addition table.
    AdditionLookup {
        /// Index of the offending 16-bit limb, least significant first.
        limb: usize,
    },
    /// `(difference, sign)` of the 16-bit limb at `limb` is not a row of the
    /// sign table.
    SignLookup {
        /// Index of the offending 16-bit limb, least significant first.
        limb: usize,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:?}", self)
    }
}

impl StdError for Error {}
