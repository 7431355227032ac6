// Number of bytes of a u64 value
pub(crate) const N_BYTES_U64: usize = 8;

// Number of bytes that will be used of gas
pub(crate) const N_BYTES_GAS: usize = N_BYTES_U64;

// Number of bytes of an account address
pub(crate) const N_BYTES_ACCOUNT_ADDRESS: usize = 20;

// Number of bytes that will be used of memory address and size. If any of
// the other bytes is nonzero, the access is an out of gas case.
pub(crate) const N_BYTES_MEMORY_ADDRESS: usize = 5;
pub(crate) const N_BYTES_MEMORY_SIZE: usize = 5;

// Number of bytes of a call data length
pub(crate) const N_BYTES_CALLDATASIZE: usize = N_BYTES_U64;

/// Maximum number of bytes a single copy step moves.
pub const MAX_COPY_BYTES: usize = 71;

/// Number of stack slots of a call frame.
pub const STACK_CAPACITY: usize = 1024;

/// Calls at this depth or deeper are rejected.
pub const MAX_CALL_DEPTH: u64 = 1024;
