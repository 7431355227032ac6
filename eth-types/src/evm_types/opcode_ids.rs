//! Opcode identifiers of the EVM instructions the constraint model knows about.
use crate::{error::Error, evm_types::GasCost};
use core::fmt::Debug;
use std::fmt;
use strum_macros::EnumIter;

/// Opcode enum. One-to-one corresponding to an `u8` value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter)]
pub enum OpcodeId {
    /// `STOP`
    STOP,
    /// `ADD`
    ADD,
    /// `MUL`
    MUL,
    /// `SUB`
    SUB,
    /// `ORIGIN`
    ORIGIN,
    /// `CALLER`
    CALLER,
    /// `CALLVALUE`
    CALLVALUE,
    /// `CALLDATASIZE`
    CALLDATASIZE,
    /// `POP`
    POP,
    /// `PUSH1`
    PUSH1,
    /// `PUSH2`
    PUSH2,
    /// `PUSH3`
    PUSH3,
    /// `PUSH4`
    PUSH4,
    /// `PUSH5`
    PUSH5,
    /// `PUSH6`
    PUSH6,
    /// `PUSH7`
    PUSH7,
    /// `PUSH8`
    PUSH8,
    /// `PUSH9`
    PUSH9,
    /// `PUSH10`
    PUSH10,
    /// `PUSH11`
    PUSH11,
    /// `PUSH12`
    PUSH12,
    /// `PUSH13`
    PUSH13,
    /// `PUSH14`
    PUSH14,
    /// `PUSH15`
    PUSH15,
    /// `PUSH16`
    PUSH16,
    /// `PUSH17`
    PUSH17,
    /// `PUSH18`
    PUSH18,
    /// `PUSH19`
    PUSH19,
    /// `PUSH20`
    PUSH20,
    /// `PUSH21`
    PUSH21,
    /// `PUSH22`
    PUSH22,
    /// `PUSH23`
    PUSH23,
    /// `PUSH24`
    PUSH24,
    /// `PUSH25`
    PUSH25,
    /// `PUSH26`
    PUSH26,
    /// `PUSH27`
    PUSH27,
    /// `PUSH28`
    PUSH28,
    /// `PUSH29`
    PUSH29,
    /// `PUSH30`
    PUSH30,
    /// `PUSH31`
    PUSH31,
    /// `PUSH32`
    PUSH32,
    /// `CALL`
    CALL,
    /// `RETURN`
    RETURN,
    /// `REVERT`
    REVERT,
    /// Invalid opcode
    INVALID(u8),
}

impl OpcodeId {
    /// Returns `true` if the `OpcodeId` is a `PUSHn`.
    pub fn is_push(&self) -> bool {
        self.as_u8() >= Self::PUSH1.as_u8() && self.as_u8() <= Self::PUSH32.as_u8()
    }
}

impl OpcodeId {
    /// Returns the `OpcodeId` as a `u8`.
    pub const fn as_u8(&self) -> u8 {
        match self {
            OpcodeId::STOP => 0x00u8,
            OpcodeId::ADD => 0x01u8,
            OpcodeId::MUL => 0x02u8,
            OpcodeId::SUB => 0x03u8,
            OpcodeId::ORIGIN => 0x32u8,
            OpcodeId::CALLER => 0x33u8,
            OpcodeId::CALLVALUE => 0x34u8,
            OpcodeId::CALLDATASIZE => 0x36u8,
            OpcodeId::POP => 0x50u8,
            OpcodeId::PUSH1 => 0x60u8,
            OpcodeId::PUSH2 => 0x61u8,
            OpcodeId::PUSH3 => 0x62u8,
            OpcodeId::PUSH4 => 0x63u8,
            OpcodeId::PUSH5 => 0x64u8,
            OpcodeId::PUSH6 => 0x65u8,
            OpcodeId::PUSH7 => 0x66u8,
            OpcodeId::PUSH8 => 0x67u8,
            OpcodeId::PUSH9 => 0x68u8,
            OpcodeId::PUSH10 => 0x69u8,
            OpcodeId::PUSH11 => 0x6au8,
            OpcodeId::PUSH12 => 0x6bu8,
            OpcodeId::PUSH13 => 0x6cu8,
            OpcodeId::PUSH14 => 0x6du8,
            OpcodeId::PUSH15 => 0x6eu8,
            OpcodeId::PUSH16 => 0x6fu8,
            OpcodeId::PUSH17 => 0x70u8,
            OpcodeId::PUSH18 => 0x71u8,
            OpcodeId::PUSH19 => 0x72u8,
            OpcodeId::PUSH20 => 0x73u8,
            OpcodeId::PUSH21 => 0x74u8,
            OpcodeId::PUSH22 => 0x75u8,
            OpcodeId::PUSH23 => 0x76u8,
            OpcodeId::PUSH24 => 0x77u8,
            OpcodeId::PUSH25 => 0x78u8,
            OpcodeId::PUSH26 => 0x79u8,
            OpcodeId::PUSH27 => 0x7au8,
            OpcodeId::PUSH28 => 0x7bu8,
            OpcodeId::PUSH29 => 0x7cu8,
            OpcodeId::PUSH30 => 0x7du8,
            OpcodeId::PUSH31 => 0x7eu8,
            OpcodeId::PUSH32 => 0x7fu8,
            OpcodeId::CALL => 0xf1u8,
            OpcodeId::RETURN => 0xf3u8,
            OpcodeId::REVERT => 0xfdu8,
            OpcodeId::INVALID(b) => *b,
        }
    }

    /// Returns the `OpcodeId` as a `u64`.
    pub const fn as_u64(&self) -> u64 {
        self.as_u8() as u64
    }

    /// Returns the constant gas cost of `OpcodeId`
    pub const fn constant_gas_cost(&self) -> GasCost {
        match self {
            OpcodeId::STOP => GasCost::ZERO,
            OpcodeId::ADD => GasCost::FASTEST,
            OpcodeId::MUL => GasCost::FAST,
            OpcodeId::SUB => GasCost::FASTEST,
            OpcodeId::ORIGIN => GasCost::QUICK,
            OpcodeId::CALLER => GasCost::QUICK,
            OpcodeId::CALLVALUE => GasCost::QUICK,
            OpcodeId::CALLDATASIZE => GasCost::QUICK,
            OpcodeId::POP => GasCost::QUICK,
            OpcodeId::PUSH1 => GasCost::FASTEST,
            OpcodeId::PUSH2 => GasCost::FASTEST,
            OpcodeId::PUSH3 => GasCost::FASTEST,
            OpcodeId::PUSH4 => GasCost::FASTEST,
            OpcodeId::PUSH5 => GasCost::FASTEST,
            OpcodeId::PUSH6 => GasCost::FASTEST,
            OpcodeId::PUSH7 => GasCost::FASTEST,
            OpcodeId::PUSH8 => GasCost::FASTEST,
            OpcodeId::PUSH9 => GasCost::FASTEST,
            OpcodeId::PUSH10 => GasCost::FASTEST,
            OpcodeId::PUSH11 => GasCost::FASTEST,
            OpcodeId::PUSH12 => GasCost::FASTEST,
            OpcodeId::PUSH13 => GasCost::FASTEST,
            OpcodeId::PUSH14 => GasCost::FASTEST,
            OpcodeId::PUSH15 => GasCost::FASTEST,
            OpcodeId::PUSH16 => GasCost::FASTEST,
            OpcodeId::PUSH17 => GasCost::FASTEST,
            OpcodeId::PUSH18 => GasCost::FASTEST,
            OpcodeId::PUSH19 => GasCost::FASTEST,
            OpcodeId::PUSH20 => GasCost::FASTEST,
            OpcodeId::PUSH21 => GasCost::FASTEST,
            OpcodeId::PUSH22 => GasCost::FASTEST,
            OpcodeId::PUSH23 => GasCost::FASTEST,
            OpcodeId::PUSH24 => GasCost::FASTEST,
            OpcodeId::PUSH25 => GasCost::FASTEST,
            OpcodeId::PUSH26 => GasCost::FASTEST,
            OpcodeId::PUSH27 => GasCost::FASTEST,
            OpcodeId::PUSH28 => GasCost::FASTEST,
            OpcodeId::PUSH29 => GasCost::FASTEST,
            OpcodeId::PUSH30 => GasCost::FASTEST,
            OpcodeId::PUSH31 => GasCost::FASTEST,
            OpcodeId::PUSH32 => GasCost::FASTEST,
            OpcodeId::CALL => GasCost::WARM_ACCESS,
            OpcodeId::RETURN => GasCost::ZERO,
            OpcodeId::REVERT => GasCost::ZERO,
            OpcodeId::INVALID(_) => GasCost::ZERO,
        }
    }

    /// Returns PUSHn opcode from parameter n.
    pub fn push_n(n: u8) -> Result<Self, Error> {
        if (1..=32).contains(&n) {
            Ok(OpcodeId::from(OpcodeId::PUSH1.as_u8() + n - 1))
        } else {
            Err(Error::InvalidOpConversion)
        }
    }

    /// Returns number of bytes used by immediate data. This is > 0 only for
    /// push opcodes.
    pub fn data_len(&self) -> usize {
        if self.is_push() {
            (self.as_u8() - OpcodeId::PUSH1.as_u8() + 1) as usize
        } else {
            0
        }
    }
}

impl From<u8> for OpcodeId {
    fn from(value: u8) -> Self {
        match value {
            0x00u8 => OpcodeId::STOP,
            0x01u8 => OpcodeId::ADD,
            0x02u8 => OpcodeId::MUL,
            0x03u8 => OpcodeId::SUB,
            0x32u8 => OpcodeId::ORIGIN,
            0x33u8 => OpcodeId::CALLER,
            0x34u8 => OpcodeId::CALLVALUE,
            0x36u8 => OpcodeId::CALLDATASIZE,
            0x50u8 => OpcodeId::POP,
            0x60u8 => OpcodeId::PUSH1,
            0x61u8 => OpcodeId::PUSH2,
            0x62u8 => OpcodeId::PUSH3,
            0x63u8 => OpcodeId::PUSH4,
            0x64u8 => OpcodeId::PUSH5,
            0x65u8 => OpcodeId::PUSH6,
            0x66u8 => OpcodeId::PUSH7,
            0x67u8 => OpcodeId::PUSH8,
            0x68u8 => OpcodeId::PUSH9,
            0x69u8 => OpcodeId::PUSH10,
            0x6au8 => OpcodeId::PUSH11,
            0x6bu8 => OpcodeId::PUSH12,
            0x6cu8 => OpcodeId::PUSH13,
            0x6du8 => OpcodeId::PUSH14,
            0x6eu8 => OpcodeId::PUSH15,
            0x6fu8 => OpcodeId::PUSH16,
            0x70u8 => OpcodeId::PUSH17,
            0x71u8 => OpcodeId::PUSH18,
            0x72u8 => OpcodeId::PUSH19,
            0x73u8 => OpcodeId::PUSH20,
            0x74u8 => OpcodeId::PUSH21,
            0x75u8 => OpcodeId::PUSH22,
            0x76u8 => OpcodeId::PUSH23,
            0x77u8 => OpcodeId::PUSH24,
            0x78u8 => OpcodeId::PUSH25,
            0x79u8 => OpcodeId::PUSH26,
            0x7au8 => OpcodeId::PUSH27,
            0x7bu8 => OpcodeId::PUSH28,
            0x7cu8 => OpcodeId::PUSH29,
            0x7du8 => OpcodeId::PUSH30,
            0x7eu8 => OpcodeId::PUSH31,
            0x7fu8 => OpcodeId::PUSH32,
            0xf1u8 => OpcodeId::CALL,
            0xf3u8 => OpcodeId::RETURN,
            0xfdu8 => OpcodeId::REVERT,
            b => OpcodeId::INVALID(b),
        }
    }
}

impl fmt::Display for OpcodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
