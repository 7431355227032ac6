use eth_types::{evm_types::OpcodeId, Field};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::param::STACK_CAPACITY;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum ExecutionState {
    // Internal state
    BeginTx,
    EndTx,
    EndBlock,
    CopyToMemory,
    // Opcode successful cases
    STOP,
    ADD_SUB, // ADD, SUB
    ORIGIN,
    CALLER,
    CALLDATASIZE,
    CALL,
    RETURN,
    REVERT,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::STOP
    }
}

impl ExecutionState {
    pub(crate) fn as_u64(&self) -> u64 {
        *self as u64
    }

    pub(crate) fn responsible_opcodes(&self) -> Vec<OpcodeId> {
        match self {
            Self::STOP => vec![OpcodeId::STOP],
            Self::ADD_SUB => vec![OpcodeId::ADD, OpcodeId::SUB],
            Self::ORIGIN => vec![OpcodeId::ORIGIN],
            Self::CALLER => vec![OpcodeId::CALLER],
            Self::CALLDATASIZE => vec![OpcodeId::CALLDATASIZE],
            Self::CALL => vec![OpcodeId::CALL],
            Self::RETURN => vec![OpcodeId::RETURN],
            Self::REVERT => vec![OpcodeId::REVERT],
            _ => vec![],
        }
    }

    /// Every `(state, opcode)` row of the responsible opcode table.
    pub(crate) fn iter_responsible_opcodes() -> impl Iterator<Item = (Self, OpcodeId)> {
        Self::iter().flat_map(|state| {
            state
                .responsible_opcodes()
                .into_iter()
                .map(move |opcode| (state, opcode))
        })
    }

    /// States that end a call, a transaction or the block. They are only
    /// accepted as the final step of a trace.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::STOP | Self::RETURN | Self::REVERT | Self::EndTx | Self::EndBlock
        )
    }
}

/// Continuation state of a copy into the current call's memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyToMemoryAuxData<F> {
    /// Source address of the next byte to copy
    pub src_addr: F,
    /// End of the source buffer, bytes at or past it read as zero
    pub src_addr_end: F,
    /// Bytes still to be written to memory
    pub bytes_left: F,
    /// Destination address of the next byte to write
    pub dst_addr: F,
    /// Whether the source is the transaction calldata instead of memory
    pub from_tx: F,
    /// Transaction whose calldata is read when `from_tx` is set
    pub tx_id: F,
}

/// Opcode-specific data carried from one step into the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepAuxiliaryData<F> {
    /// Data of [`ExecutionState::CopyToMemory`]
    CopyToMemory(CopyToMemoryAuxData<F>),
}

/// Machine state at an instruction boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepState<F> {
    /// The execution state selector for the step
    pub execution_state: ExecutionState,
    /// The Read/Write counter
    pub rw_counter: F,
    /// The unique identifier of call in the whole proof, using the
    /// `rw_counter` at the call step.
    pub call_id: F,
    /// Whether the call is root call
    pub is_root: F,
    /// Whether the call is a create call
    pub is_create: F,
    /// Denotes the RLC of the code hash of the current call.
    pub code_source: F,
    /// The program counter
    pub program_counter: F,
    /// The stack pointer
    pub stack_pointer: F,
    /// The amount of gas left
    pub gas_left: F,
    /// Memory size in words (32 bytes)
    pub memory_size: F,
    /// The counter for state writes of the current call
    pub state_write_counter: F,
    /// Continuation data of multi-step gadgets
    pub aux_data: Option<StepAuxiliaryData<F>>,
}

impl<F: Field> Default for StepState<F> {
    fn default() -> Self {
        Self {
            execution_state: ExecutionState::default(),
            rw_counter: F::zero(),
            call_id: F::zero(),
            is_root: F::zero(),
            is_create: F::zero(),
            code_source: F::zero(),
            program_counter: F::zero(),
            stack_pointer: F::from(STACK_CAPACITY as u64),
            gas_left: F::zero(),
            memory_size: F::zero(),
            state_write_counter: F::zero(),
            aux_data: None,
        }
    }
}

impl<F: Field> StepState<F> {
    pub(crate) fn copy_to_memory_aux(&self) -> Option<&CopyToMemoryAuxData<F>> {
        match &self.aux_data {
            Some(StepAuxiliaryData::CopyToMemory(aux)) => Some(aux),
            None => None,
        }
    }
}
