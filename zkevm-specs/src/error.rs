//! Error module for the zkevm-specs crate

use crate::evm_circuit::step::ExecutionState;
use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error as StdError;

/// Verdict of a failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A named equality, boolean or zero check does not hold.
    ConstraintUnsatisfied {
        /// Name of the failing constraint.
        name: &'static str,
    },
    /// A tuple is absent from a lookup table.
    LookupMiss {
        /// Table the lookup went to.
        table: &'static str,
        /// What was looked up.
        detail: String,
    },
    /// A value does not fit the byte width it is range checked against.
    OutOfRange {
        /// Name of the checked value.
        name: &'static str,
        /// Byte width of the range check.
        n_bytes: usize,
    },
    /// The step is missing auxiliary data the handler requires, or the
    /// auxiliary data has the wrong shape for its execution state.
    InvalidAuxData(ExecutionState),
    /// The path is deliberately not modelled.
    Unimplemented(&'static str),
    /// No handler is registered for the execution state.
    UnsupportedExecutionState(ExecutionState),
    /// The read/write table is not consistent at the given counter.
    RwInconsistent {
        /// Counter of the offending row.
        rw_counter: usize,
        /// What is inconsistent.
        detail: String,
    },
    /// The trace as a whole is malformed, e.g. empty or not terminated.
    InvalidTrace(&'static str),
    /// Limb arithmetic lookup failure.
    Gadget(gadgets::Error),
}

impl Error {
    /// Returns true when the error means the witness does not satisfy the
    /// constraints, as opposed to a precondition violation or a path that is
    /// not modelled.
    pub fn is_witness_failure(&self) -> bool {
        matches!(
            self,
            Error::ConstraintUnsatisfied { .. }
                | Error::LookupMiss { .. }
                | Error::OutOfRange { .. }
                | Error::RwInconsistent { .. }
                | Error::InvalidTrace(_)
                | Error::Gadget(_)
        )
    }
}

impl From<gadgets::Error> for Error {
    fn from(err: gadgets::Error) -> Self {
        Error::Gadget(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:?}", self)
    }
}

impl StdError for Error {}
