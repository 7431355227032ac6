//! Evm types needed by the constraint model: gas schedule and opcodes.

use std::fmt;

pub mod opcode_ids;

pub use opcode_ids::OpcodeId;

/// Gas stipend when CALL or CALLCODE is attached with value.
pub const GAS_STIPEND_CALL_WITH_VALUE: u64 = 2300;

/// Defines the gas consumption.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct GasCost(pub u64);

impl fmt::Debug for GasCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}

impl GasCost {
    /// Constant cost for free step
    pub const ZERO: Self = Self(0);
    /// Constant cost for quick step
    pub const QUICK: Self = Self(2);
    /// Constant cost for fastest step
    pub const FASTEST: Self = Self(3);
    /// Constant cost for fast step
    pub const FAST: Self = Self(5);
    /// Constant cost for accessing account or storage key
    pub const WARM_ACCESS: Self = Self(100);
    /// Constant cost for a cold account access
    pub const COLD_ACCOUNT_ACCESS: Self = Self(2600);
    /// Constant cost for a non-creation transaction
    pub const TX: Self = Self(21000);
    /// Constant cost for a creation transaction
    pub const CREATION_TX: Self = Self(53000);
    /// Constant cost for calling with non-zero value
    pub const CALL_WITH_VALUE: Self = Self(9000);
    /// Constant cost for turning empty account into non-empty account
    pub const NEW_ACCOUNT: Self = Self(25000);
    /// Cost of a zero byte of transaction calldata
    pub const TX_DATA_ZERO: Self = Self(4);
    /// Cost of a non-zero byte of transaction calldata
    pub const TX_DATA_NON_ZERO: Self = Self(16);
    /// Denominator of quadratic part of memory expansion gas cost
    pub const MEMORY_EXPANSION_QUAD_DENOMINATOR: Self = Self(512);
    /// Coefficient of linear part of memory expansion gas cost
    pub const MEMORY_EXPANSION_LINEAR_COEFF: Self = Self(3);
}

impl GasCost {
    /// Returns the `GasCost` as a `u64`.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the `GasCost` as a `usize`.
    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for GasCost {
    fn from(cost: u8) -> Self {
        GasCost(cost as u64)
    }
}

impl From<u64> for GasCost {
    fn from(cost: u64) -> Self {
        GasCost(cost)
    }
}

/// Intrinsic gas charged for transaction calldata.
pub fn tx_data_gas_cost(data: &[u8]) -> u64 {
    data.iter()
        .map(|byte| {
            if *byte == 0 {
                GasCost::TX_DATA_ZERO.as_u64()
            } else {
                GasCost::TX_DATA_NON_ZERO.as_u64()
            }
        })
        .sum()
}
