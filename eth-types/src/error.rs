//! Error module for the eth-types crate

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error as StdError;

/// Error type for any eth-types related failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Denotes that the byte in the bytecode does not match with any Opcode ID.
    InvalidOpcodeIdByte(u8),
    /// Error while trying to convert to an incorrect `OpcodeId`.
    InvalidOpConversion,
    /// Insufficient number of bytes following a PUSH instruction.
    InsufficientPush,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:?}", self)
    }
}

impl StdError for Error {}
