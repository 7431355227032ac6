use crate::{
    evm_circuit::{
        execution::ExecutionGadget,
        param::N_BYTES_CALLDATASIZE,
        step::ExecutionState,
        util::{
            common_gadget::same_context,
            constraint_builder::{ConstraintBuilder, StepStateTransition, Transition::Delta},
        },
    },
    table::CallContextFieldTag,
    util::Expr,
    Error,
};
use eth_types::Field;

pub(crate) struct CallDataSizeGadget;

impl<F: Field> ExecutionGadget<F> for CallDataSizeGadget {
    const NAME: &'static str = "CALLDATASIZE";

    const EXECUTION_STATE: ExecutionState = ExecutionState::CALLDATASIZE;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        let opcode = cb.opcode_lookup(true)?;

        // Add lookup constraint in the call context for the calldatasize field.
        let call_data_size = cb.call_context_read(CallContextFieldTag::CallDataLength)?;

        // The calldatasize should be pushed to the top of the stack.
        let pushed = cb.stack_push()?;
        cb.require_equal(
            "call data length is pushed",
            call_data_size,
            cb.word_to_field_exact("call data size", &pushed, N_BYTES_CALLDATASIZE)?,
        )?;

        same_context(
            cb,
            opcode,
            StepStateTransition {
                rw_counter: Delta(2.expr()),
                program_counter: Delta(1.expr()),
                stack_pointer: Delta((-1).expr()),
                ..Default::default()
            },
            None,
        )
    }
}
